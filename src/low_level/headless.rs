use std::collections::BTreeMap;

use anyhow::{anyhow, bail};
use ndarray::IxDyn;
use tracing::{debug, warn};

use super::env::player_key;
use super::{DType, Engine, Event, FlatAction, FlatObservation, Spec, StepType, Tensor, TimeStep};
use crate::error::ConfigurationError;
use crate::scene::SceneDescription;

/// An [`Engine`] without game rules.
///
/// Built from a compiled scene, it exposes the observation and action specs
/// the scene implies, checks every action against them, returns zeroed
/// observations of the right shapes, and ends the episode after
/// `episodeLengthFrames` steps, or after one step when that is 0.
pub struct HeadlessEngine {
    observation_spec: BTreeMap<String, Spec>,
    action_spec: BTreeMap<String, Spec>,
    episode_length: u32,
    frame: Option<u32>,
    events: Vec<Event>,
}

impl HeadlessEngine {
    pub fn new(scene: &SceneDescription) -> Result<HeadlessEngine, ConfigurationError> {
        let avatars: Vec<_> = scene
            .avatars()
            .filter_map(|e| Some((e.avatar()?, e.reports_ready_to_shoot())))
            .collect();
        if avatars.len() != scene.num_players {
            return Err(ConfigurationError::InvalidPlayerCount {
                count: scene.num_players,
                reason: "the scene places a different number of avatars",
            });
        }
        let sprite = scene.sprite_size as usize;
        let (width, height) = scene.grid();
        let mut observation_spec = BTreeMap::new();
        let mut action_spec = BTreeMap::new();
        for (avatar, ready_to_shoot) in avatars {
            let p = avatar.index;
            let view = avatar.view;
            let rows = (view.forward + view.backward + 1) as usize * sprite;
            let columns = (view.left + view.right + 1) as usize * sprite;
            for (name, spec) in [
                ("RGB", Spec::array("RGB", &[rows, columns, 3], DType::U8)),
                ("POSITION", Spec::array("POSITION", &[2], DType::I32)),
                ("ORIENTATION", Spec::array("ORIENTATION", &[], DType::I32)),
                ("REWARD", Spec::array("REWARD", &[], DType::F64)),
            ] {
                observation_spec.insert(player_key(p, name), spec);
            }
            if ready_to_shoot {
                observation_spec.insert(
                    player_key(p, "READY_TO_SHOOT"),
                    Spec::array("READY_TO_SHOOT", &[], DType::F64),
                );
            }
            for (name, range) in &avatar.action_spec {
                action_spec.insert(
                    player_key(p, name),
                    Spec::bounded_int(name, range.min, range.max),
                );
            }
        }
        observation_spec.insert(
            "WORLD.RGB".to_string(),
            Spec::array("WORLD.RGB", &[height * sprite, width * sprite, 3], DType::U8),
        );
        let episode_length = if scene.episode_length_frames == 0 {
            warn!(level = %scene.level_name, "episodeLengthFrames is 0, ending after one step");
            1
        } else {
            scene.episode_length_frames
        };
        debug!(
            level = %scene.level_name,
            observations = observation_spec.len(),
            actions = action_spec.len(),
            "headless engine ready"
        );
        Ok(HeadlessEngine {
            observation_spec,
            action_spec,
            episode_length,
            frame: None,
            events: vec![],
        })
    }

    /// Steps taken since the last reset, `None` before the first reset.
    pub fn frame(&self) -> Option<u32> {
        self.frame
    }

    fn observation(&self) -> FlatObservation {
        self.observation_spec
            .iter()
            .map(|(key, spec)| {
                let shape = spec.shape().unwrap_or(&[]);
                (key.clone(), Tensor::zeros(IxDyn(shape)))
            })
            .collect()
    }

    fn check(&self, action: &FlatAction) -> anyhow::Result<()> {
        for (key, value) in action {
            let spec = self
                .action_spec
                .get(key)
                .ok_or_else(|| anyhow!("unknown action {key:?}"))?;
            if let Some((lo, hi)) = spec.int_range() {
                if !(lo..=hi).contains(value) {
                    bail!("action {key:?} = {value} is outside [{lo}, {hi}]");
                }
            }
        }
        Ok(())
    }
}

impl Engine for HeadlessEngine {
    fn observation_spec(&self) -> BTreeMap<String, Spec> {
        self.observation_spec.clone()
    }

    fn action_spec(&self) -> BTreeMap<String, Spec> {
        self.action_spec.clone()
    }

    fn reset(&mut self) -> anyhow::Result<TimeStep> {
        self.frame = Some(0);
        self.events.clear();
        Ok(TimeStep {
            step_type: StepType::First,
            observation: self.observation(),
        })
    }

    fn step(&mut self, action: &FlatAction) -> anyhow::Result<TimeStep> {
        let frame = match self.frame {
            None => bail!("step called before reset"),
            Some(frame) if frame >= self.episode_length => {
                bail!("episode ended after {frame} frames, reset first")
            }
            Some(frame) => frame + 1,
        };
        self.check(action)?;
        if action.len() < self.action_spec.len() {
            warn!(
                given = action.len(),
                expected = self.action_spec.len(),
                "missing actions default to 0"
            );
        }
        self.frame = Some(frame);
        let step_type = if frame >= self.episode_length {
            self.events.push(Event {
                name: "episode_end".to_string(),
                payload: serde_json::json!({ "frames": frame }),
            });
            StepType::Last
        } else {
            StepType::Mid
        };
        Ok(TimeStep {
            step_type,
            observation: self.observation(),
        })
    }

    fn events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
