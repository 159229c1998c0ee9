//! Registry of pre-trained background players.

use ndarray::arr1;

use crate::low_level::PlayerObservation;

/// Rewrites a puppet's observation at the given step before its model sees it.
pub type PuppeteerFn = fn(u64, &PlayerObservation) -> PlayerObservation;

/// Observation key holding the goal a puppeteer gives its puppet.
pub const GOAL: &str = "GOAL";
const CLEAN_GOAL: [f64; 2] = [1.0, 0.0];
const EAT_GOAL: [f64; 2] = [0.0, 1.0];
const SWITCH_EVERY: u64 = 250;

fn with_goal(observation: &PlayerObservation, goal: [f64; 2]) -> PlayerObservation {
    let mut observation = observation.clone();
    observation.insert(GOAL.to_string(), arr1(&goal).into_dyn());
    observation
}

/// True for steps `0..250` and `500..750`.
fn first_phase(step: u64) -> bool {
    (step / SWITCH_EVERY).min(3) % 2 == 0
}

/// Cleans, then eats, then cleans again, switching every 250 steps and eating from step 750 on.
pub fn cleanup_alternate_clean_first(
    step: u64,
    observation: &PlayerObservation,
) -> PlayerObservation {
    let goal = if first_phase(step) { CLEAN_GOAL } else { EAT_GOAL };
    with_goal(observation, goal)
}

/// Eats, then cleans, then eats again, switching every 250 steps and cleaning from step 750 on.
pub fn cleanup_alternate_eat_first(
    step: u64,
    observation: &PlayerObservation,
) -> PlayerObservation {
    let goal = if first_phase(step) { EAT_GOAL } else { CLEAN_GOAL };
    with_goal(observation, goal)
}

#[derive(Clone, Copy)]
pub struct Bot {
    pub substrate: &'static str,
    pub puppeteer: Option<PuppeteerFn>,
    /// Name of the saved model the bot runs.
    pub model: &'static str,
}

const fn saved_model(substrate: &'static str, model: &'static str) -> Bot {
    Bot {
        substrate,
        puppeteer: None,
        model,
    }
}

const fn puppet(substrate: &'static str, puppeteer: PuppeteerFn) -> Bot {
    Bot {
        substrate,
        puppeteer: Some(puppeteer),
        model: "puppet",
    }
}

pub const BOTS: &[(&str, Bot)] = &[
    ("cleanup_cleaner_1", saved_model("clean_up", "cleanup_cleaner_1")),
    ("cleanup_cleaner_2", saved_model("clean_up", "cleanup_cleaner_2")),
    ("cleanup_consumer_0", saved_model("clean_up", "cleanup_consumer_0")),
    ("cleanup_consumer_1", saved_model("clean_up", "cleanup_consumer_1")),
    ("cleanup_consumer_2", saved_model("clean_up", "cleanup_consumer_2")),
    ("cleanup_puppet_alternate_clean_first", puppet("clean_up", cleanup_alternate_clean_first)),
    ("cleanup_puppet_alternate_eat_first", puppet("clean_up", cleanup_alternate_eat_first)),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_0",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_0",
        ),
    ),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_2",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_2",
        ),
    ),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_3",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_3",
        ),
    ),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_4",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_4",
        ),
    ),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_6",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_6",
        ),
    ),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_7",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_7",
        ),
    ),
    (
        "collaborative_cooking_impassable_vmpo_pop_size_ten_9",
        saved_model(
            "collaborative_cooking_impassable",
            "collaborative_cooking_impassable_vmpo_pop_size_ten_9",
        ),
    ),
    (
        "collaborative_cooking_passable_vmpo_pop_size_ten_5",
        saved_model(
            "collaborative_cooking_passable",
            "collaborative_cooking_passable_vmpo_pop_size_ten_5",
        ),
    ),
];

pub fn get_bot(name: &str) -> Option<&'static Bot> {
    BOTS.iter().find(|(n, _)| *n == name).map(|(_, bot)| bot)
}

/// Names of the bots that play `substrate`.
pub fn bots_for(substrate: &str) -> Vec<&'static str> {
    BOTS.iter()
        .filter(|(_, bot)| bot.substrate == substrate)
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::substrates::SUBSTRATES;

    #[test]
    fn test_bots_play_registered_substrates() {
        for (name, bot) in BOTS {
            assert!(SUBSTRATES.contains(&bot.substrate), "{name}");
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = BOTS.iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), BOTS.len());
    }

    #[test]
    fn test_lookup() {
        let bot = get_bot("collaborative_cooking_passable_vmpo_pop_size_ten_5").unwrap();
        assert_eq!(bot.substrate, "collaborative_cooking_passable");
        assert!(bot.puppeteer.is_none());
        assert!(get_bot("missing").is_none());
        assert_eq!(bots_for("collaborative_cooking_impassable").len(), 7);
        assert_eq!(bots_for("clean_up").len(), 7);
    }

    fn goal(bot: &str, step: u64) -> Vec<f64> {
        let puppeteer = get_bot(bot).unwrap().puppeteer.unwrap();
        let observation = maplit::btreemap! {
            "RGB".to_string() => ndarray::arr0(0.0).into_dyn(),
        };
        let rewritten = puppeteer(step, &observation);
        assert!(rewritten.contains_key("RGB"));
        rewritten[GOAL].iter().copied().collect()
    }

    #[test]
    fn test_alternating_puppeteers() {
        let clean = vec![1.0, 0.0];
        let eat = vec![0.0, 1.0];
        let bot = "cleanup_puppet_alternate_clean_first";
        assert_eq!(get_bot(bot).unwrap().model, "puppet");
        assert_eq!(goal(bot, 0), clean);
        assert_eq!(goal(bot, 249), clean);
        assert_eq!(goal(bot, 250), eat);
        assert_eq!(goal(bot, 500), clean);
        assert_eq!(goal(bot, 750), eat);
        assert_eq!(goal(bot, 5000), eat);

        let bot = "cleanup_puppet_alternate_eat_first";
        assert_eq!(goal(bot, 0), eat);
        assert_eq!(goal(bot, 499), clean);
        assert_eq!(goal(bot, 600), eat);
        assert_eq!(goal(bot, 1000), clean);
    }
}
