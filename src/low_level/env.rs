use std::collections::BTreeMap;

use ndarray::ArrayD;
use serde::Serialize;

use super::Spec;

/// A numeric observation channel.
pub type Tensor = ArrayD<f64>;
/// Flat, key-encoded observation of the raw engine, e.g. `"1.RGB"` or `"WORLD.RGB"`.
pub type FlatObservation = BTreeMap<String, Tensor>;
/// Flat, key-encoded joint action, e.g. `"2.move" -> 1`.
pub type FlatAction = BTreeMap<String, i64>;
/// Observation of a single player, keyed by channel name without the player prefix.
pub type PlayerObservation = BTreeMap<String, Tensor>;
/// Action of a single player, keyed by sub-action name.
pub type PlayerAction = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    First,
    Mid,
    Last,
}

/// Diagnostic event surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Timestep of the raw engine. Per-player rewards live in `"<p>.REWARD"` observations.
#[derive(Debug, Clone)]
pub struct TimeStep {
    pub step_type: StepType,
    pub observation: FlatObservation,
}

impl TimeStep {
    pub fn last(&self) -> bool {
        self.step_type == StepType::Last
    }
}

/// Timestep of the joint multi-player protocol. Index `i` belongs to player `i + 1`.
#[derive(Debug, Clone)]
pub struct JointTimeStep {
    pub step_type: StepType,
    pub rewards: Vec<f64>,
    pub observations: Vec<PlayerObservation>,
}

impl JointTimeStep {
    pub fn last(&self) -> bool {
        self.step_type == StepType::Last
    }
}

/// The external simulation engine, driven through flat key-encoded specs and actions.
///
/// The engine is owned by exactly one caller. Steps are strictly sequential.
pub trait Engine {
    fn observation_spec(&self) -> BTreeMap<String, Spec>;
    fn action_spec(&self) -> BTreeMap<String, Spec>;

    fn reset(&mut self) -> anyhow::Result<TimeStep>;
    fn step(&mut self, action: &FlatAction) -> anyhow::Result<TimeStep>;

    /// Events raised during the last step.
    fn events(&mut self) -> Vec<Event> {
        vec![]
    }

    fn close(&mut self) {}
}

/// The joint multi-player protocol: one spec and one observation per player.
pub trait Substrate {
    fn num_players(&self) -> usize;
    fn observation_spec(&self) -> Vec<Spec>;
    fn action_spec(&self) -> Vec<Spec>;

    fn reset(&mut self) -> anyhow::Result<JointTimeStep>;
    fn step(&mut self, actions: &[PlayerAction]) -> anyhow::Result<JointTimeStep>;

    fn events(&mut self) -> Vec<Event> {
        vec![]
    }

    fn close(&mut self) {}
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn observation_spec(&self) -> BTreeMap<String, Spec> {
        (**self).observation_spec()
    }

    fn action_spec(&self) -> BTreeMap<String, Spec> {
        (**self).action_spec()
    }

    fn reset(&mut self) -> anyhow::Result<TimeStep> {
        (**self).reset()
    }

    fn step(&mut self, action: &FlatAction) -> anyhow::Result<TimeStep> {
        (**self).step(action)
    }

    fn events(&mut self) -> Vec<Event> {
        (**self).events()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Splits a flat key into its 1-based player index and channel name.
///
/// `"2.RGB"` gives `Some((2, "RGB"))`. Keys without a numeric prefix, such as
/// `"WORLD.RGB"`, give `None`.
pub fn split_key(key: &str) -> Option<(usize, &str)> {
    let (index, name) = key.split_once('.')?;
    let index = index.parse::<usize>().ok()?;
    Some((index, name))
}

/// Prefixes a channel name with a 1-based player index.
pub fn player_key(player: usize, name: &str) -> String {
    format!("{player}.{name}")
}

/// Collects per-player rewards from the `"<p>.REWARD"` observations. Players without one get 0.
pub fn rewards(observation: &FlatObservation, num_players: usize) -> Vec<f64> {
    let mut rewards = vec![0.0; num_players];
    for (key, value) in observation {
        if let Some((player, "REWARD")) = split_key(key) {
            if (1..=num_players).contains(&player) {
                rewards[player - 1] = value.sum();
            }
        }
    }
    rewards
}
