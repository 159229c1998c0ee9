use crate::low_level::PlayerObservation;

/// Marks observations shared by all players rather than seen by one.
pub const GLOBAL_KEY_MARKER: &str = "WORLD";

pub fn is_global_key(key: &str) -> bool {
    key.contains(GLOBAL_KEY_MARKER)
}

/// The part of a player's observation that only that player sees.
pub fn remove_world_observations(mut observation: PlayerObservation) -> PlayerObservation {
    observation.retain(|key, _| !is_global_key(key));
    observation
}

#[cfg(test)]
mod test {
    use maplit::btreemap;
    use ndarray::arr0;

    use super::*;

    #[test]
    fn test_remove_world_observations() {
        let observation = btreemap! {
            "RGB".to_string() => arr0(1.0).into_dyn(),
            "WORLD.RGB".to_string() => arr0(2.0).into_dyn(),
            "WORLD.READY_TO_SHOOT".to_string() => arr0(3.0).into_dyn(),
        };
        let view = remove_world_observations(observation);
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["RGB"]);
    }
}
