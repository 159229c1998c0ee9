use std::collections::BTreeMap;

use anyhow::{anyhow, bail};
use tracing::debug;

use super::env::{player_key, rewards, split_key};
use super::{
    Engine, Event, FlatAction, FlatObservation, JointTimeStep, PlayerAction, PlayerObservation,
    Spec, Substrate, TimeStep,
};

/// Presents a flat-keyed [`Engine`] as a joint multi-player [`Substrate`].
///
/// Individual observations (`"<p>.<NAME>"`) are split per player. Global
/// observations (e.g. `"WORLD.RGB"`) are copied into every player's view.
/// Actions are re-encoded as `"<p>.<name>"`.
pub struct MultiplayerWrapper<E> {
    env: E,
    num_players: usize,
    individual_observation_names: Vec<String>,
    global_observation_names: Vec<String>,
    action_names: Vec<String>,
}

impl<E: Engine> MultiplayerWrapper<E> {
    pub fn new(
        env: E,
        individual_observation_names: &[&str],
        global_observation_names: &[&str],
    ) -> anyhow::Result<Self> {
        let mut players = 0;
        let mut action_names = vec![];
        for key in env.action_spec().keys() {
            let (player, name) =
                split_key(key).ok_or_else(|| anyhow!("action {key:?} has no player prefix"))?;
            players = players.max(player);
            if player == 1 {
                action_names.push(name.to_string());
            }
        }
        debug!(players, actions = ?action_names, "wrapping engine");
        Ok(MultiplayerWrapper {
            env,
            num_players: players,
            individual_observation_names: individual_observation_names
                .iter()
                .map(|n| n.to_string())
                .collect(),
            global_observation_names: global_observation_names
                .iter()
                .map(|n| n.to_string())
                .collect(),
            action_names,
        })
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    fn split_observation(&self, observation: &FlatObservation) -> Vec<PlayerObservation> {
        (1..=self.num_players)
            .map(|player| {
                let mut split = PlayerObservation::new();
                for name in &self.individual_observation_names {
                    if let Some(value) = observation.get(&player_key(player, name)) {
                        split.insert(name.clone(), value.clone());
                    }
                }
                for name in &self.global_observation_names {
                    if let Some(value) = observation.get(name) {
                        split.insert(name.clone(), value.clone());
                    }
                }
                split
            })
            .collect()
    }

    fn joint(&self, timestep: TimeStep) -> JointTimeStep {
        JointTimeStep {
            step_type: timestep.step_type,
            rewards: rewards(&timestep.observation, self.num_players),
            observations: self.split_observation(&timestep.observation),
        }
    }
}

impl<E: Engine> Substrate for MultiplayerWrapper<E> {
    fn num_players(&self) -> usize {
        self.num_players
    }

    fn observation_spec(&self) -> Vec<Spec> {
        let flat = self.env.observation_spec();
        (1..=self.num_players)
            .map(|player| {
                let mut spec = BTreeMap::new();
                for name in &self.individual_observation_names {
                    if let Some(s) = flat.get(&player_key(player, name)) {
                        spec.insert(name.clone(), s.clone());
                    }
                }
                for name in &self.global_observation_names {
                    if let Some(s) = flat.get(name) {
                        spec.insert(name.clone(), s.clone());
                    }
                }
                Spec::Dict(spec)
            })
            .collect()
    }

    fn action_spec(&self) -> Vec<Spec> {
        let flat = self.env.action_spec();
        (1..=self.num_players)
            .map(|player| {
                Spec::Dict(
                    self.action_names
                        .iter()
                        .filter_map(|name| {
                            flat.get(&player_key(player, name))
                                .map(|s| (name.clone(), s.clone()))
                        })
                        .collect(),
                )
            })
            .collect()
    }

    fn reset(&mut self) -> anyhow::Result<JointTimeStep> {
        let timestep = self.env.reset()?;
        Ok(self.joint(timestep))
    }

    fn step(&mut self, actions: &[PlayerAction]) -> anyhow::Result<JointTimeStep> {
        if actions.len() != self.num_players {
            bail!(
                "expected actions for {} players, got {}",
                self.num_players,
                actions.len()
            );
        }
        let mut flat = FlatAction::new();
        for (i, action) in actions.iter().enumerate() {
            for (name, value) in action {
                flat.insert(player_key(i + 1, name), *value);
            }
        }
        let timestep = self.env.step(&flat)?;
        Ok(self.joint(timestep))
    }

    fn events(&mut self) -> Vec<Event> {
        self.env.events()
    }

    fn close(&mut self) {
        self.env.close()
    }
}
