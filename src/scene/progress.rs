use super::prefab::{
    Appearance, Component, LoadingBarVisualiser, Prefab, StateConfig, StateManager, Transform,
};
use super::shapes::{Palette, Rgba, SpriteShape, ALPHA, WHITE};

/// A bar drawn over an object that fills up while a timer runs.
///
/// The bar cells in `shape` are the letters `a`, `b`, ... in fill order, and
/// `~` is transparent. State `d` fills the first `d` cells, the last state is
/// completely filled in the `finished` color.
#[derive(Debug, Clone)]
pub struct ProgressBar<'a> {
    pub name: &'a str,
    pub steps: usize,
    pub total_time: u32,
    pub shape: &'a str,
    pub filling: Rgba,
    pub finished: Rgba,
}

impl<'a> ProgressBar<'a> {
    pub fn state_names(&self) -> Vec<String> {
        (0..=self.steps)
            .map(|d| format!("{}_{d}", self.name))
            .collect()
    }

    pub fn palette(&self, count: usize, finished: bool) -> Palette {
        let mut palette = Palette::new();
        palette.insert('~', ALPHA);
        for (i, cell) in ('a'..='z').take(self.steps).enumerate() {
            let color = match (i < count, finished) {
                (true, true) => self.finished,
                (true, false) => self.filling,
                (false, _) => WHITE,
            };
            palette.insert(cell, color);
        }
        palette
    }

    pub fn prefab(&self) -> Prefab {
        let names = self.state_names();
        let palettes = (0..=self.steps)
            .map(|d| self.palette(d, d == self.steps))
            .collect();
        Prefab::new(
            self.name,
            vec![
                Component::StateManager(StateManager {
                    initial_state: names[0].clone(),
                    state_configs: names
                        .iter()
                        .map(|n| StateConfig::new(n).layer("overlay").sprite(n))
                        .collect(),
                }),
                Component::Transform(Transform::default()),
                Component::Appearance(Appearance {
                    sprite_names: names.clone(),
                    sprite_shapes: vec![SpriteShape::Static(self.shape.to_string()); names.len()],
                    palettes,
                    no_rotates: vec![true],
                    ..Default::default()
                }),
                Component::LoadingBarVisualiser(LoadingBarVisualiser {
                    total_time: self.total_time,
                    custom_state_names: names,
                }),
            ],
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const BAR: ProgressBar = ProgressBar {
        name: "loading_bar",
        steps: 10,
        total_time: 20,
        shape: "\n~abcdefghij~\n",
        filling: [201, 178, 50, 255],
        finished: [15, 188, 15, 255],
    };

    #[test]
    fn test_states() {
        let prefab = BAR.prefab();
        assert_eq!(prefab.states().len(), 11);
        assert_eq!(prefab.states()[0], "loading_bar_0");
        assert_eq!(prefab.states()[10], "loading_bar_10");
        assert!(prefab.validate().is_ok());
    }

    #[test]
    fn test_fill_is_monotonic() {
        let filled = |p: &Palette| p.values().filter(|c| **c != WHITE && **c != ALPHA).count();
        let counts: Vec<usize> = (0..=10).map(|d| filled(&BAR.palette(d, d == 10))).collect();
        assert_eq!(counts, (0..=10).collect::<Vec<_>>());
        assert_eq!(BAR.palette(10, true)[&'j'], [15, 188, 15, 255]);
        assert_eq!(BAR.palette(3, false)[&'c'], [201, 178, 50, 255]);
        assert_eq!(BAR.palette(3, false)[&'d'], WHITE);
    }
}
