use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use super::obs::{is_global_key, remove_world_observations};
use crate::error::{ConfigurationError, MissingActionError, Result};
use crate::low_level::{
    JointTimeStep, PlayerAction, PlayerObservation, Spec, StepType, Substrate,
};
use crate::space::{spec_to_space, Space};

/// Key of the joint termination flag in [`MultiAgentStep::dones`].
pub const ALL_DONE_KEY: &str = "__all__";
/// Key under which engine events are reported in [`MultiAgentStep::infos`].
pub const COMMON_INFO_KEY: &str = "__common__";

/// Canonical id of the 0-based agent `index`.
pub fn agent_id(index: usize) -> String {
    format!("agent_{index}")
}

#[derive(Debug, Clone)]
pub struct MultiAgentStep {
    pub observations: BTreeMap<String, PlayerObservation>,
    pub rewards: BTreeMap<String, f64>,
    /// Holds only [`ALL_DONE_KEY`].
    pub dones: BTreeMap<String, bool>,
    pub infos: BTreeMap<String, Value>,
}

/// Exposes a [`Substrate`] through per-agent dictionaries.
///
/// Agent `agent_<i>` is player `i + 1` of the substrate. Observations are
/// stripped of global entries. Episodes end for all agents at once.
pub struct MultiAgentEnv<S> {
    env: S,
    agent_ids: Vec<String>,
}

impl<S: Substrate> MultiAgentEnv<S> {
    pub fn new(env: S) -> Self {
        let agent_ids = (0..env.num_players()).map(agent_id).collect();
        MultiAgentEnv { env, agent_ids }
    }

    pub fn num_agents(&self) -> usize {
        self.agent_ids.len()
    }

    pub fn agent_ids(&self) -> &[String] {
        &self.agent_ids
    }

    pub fn reset(&mut self) -> Result<BTreeMap<String, PlayerObservation>> {
        let timestep = self.env.reset()?;
        Ok(self.observations(timestep.observations))
    }

    pub fn step(&mut self, actions: &FxHashMap<String, PlayerAction>) -> Result<MultiAgentStep> {
        let actions = self
            .agent_ids
            .iter()
            .map(|id| {
                actions.get(id).cloned().ok_or_else(|| MissingActionError {
                    agent_id: id.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let JointTimeStep {
            step_type,
            rewards,
            observations,
        } = self.env.step(&actions)?;
        let done = step_type == StepType::Last;

        let mut infos = BTreeMap::new();
        let events = self.env.events();
        if !events.is_empty() {
            debug!(count = events.len(), "engine events");
            let events = serde_json::to_value(&events).map_err(anyhow::Error::from)?;
            infos.insert(COMMON_INFO_KEY.to_string(), events);
        }
        Ok(MultiAgentStep {
            observations: self.observations(observations),
            rewards: self.agent_ids.iter().cloned().zip(rewards).collect(),
            dones: BTreeMap::from([(ALL_DONE_KEY.to_string(), done)]),
            infos,
        })
    }

    pub fn close(&mut self) {
        self.env.close()
    }

    /// Observation space of player 0, without global entries.
    pub fn single_player_observation_space(&self) -> Result<Space> {
        let spec = self.first(self.env.observation_spec())?;
        Ok(spec_to_space(&spec)?.without_keys(is_global_key))
    }

    /// Action space of player 0.
    pub fn single_player_action_space(&self) -> Result<Space> {
        let spec = self.first(self.env.action_spec())?;
        Ok(spec_to_space(&spec)?)
    }

    pub fn inner(&self) -> &S {
        &self.env
    }

    fn first(&self, specs: Vec<Spec>) -> Result<Spec> {
        let spec = specs
            .into_iter()
            .next()
            .ok_or(ConfigurationError::InvalidPlayerCount {
                count: 0,
                reason: "the substrate has no players",
            })?;
        Ok(spec)
    }

    fn observations(
        &self,
        observations: Vec<PlayerObservation>,
    ) -> BTreeMap<String, PlayerObservation> {
        self.agent_ids
            .iter()
            .cloned()
            .zip(observations.into_iter().map(remove_world_observations))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use anyhow::bail;
    use maplit::btreemap;
    use ndarray::arr0;

    use super::*;
    use crate::error::Error;
    use crate::low_level::{DType, Event};

    /// Two players. Player 1 earns its step count as reward. Ends after `length` steps.
    struct Scripted {
        length: usize,
        steps: usize,
        seen: Vec<Vec<PlayerAction>>,
        fail: bool,
    }

    impl Scripted {
        fn new(length: usize) -> Self {
            Scripted {
                length,
                steps: 0,
                seen: vec![],
                fail: false,
            }
        }

        fn timestep(&self, step_type: StepType) -> JointTimeStep {
            let observation = btreemap! {
                "RGB".to_string() => arr0(1.0).into_dyn(),
                "WORLD.RGB".to_string() => arr0(2.0).into_dyn(),
            };
            JointTimeStep {
                step_type,
                rewards: vec![self.steps as f64, 0.0],
                observations: vec![observation.clone(), observation],
            }
        }
    }

    impl Substrate for Scripted {
        fn num_players(&self) -> usize {
            2
        }

        fn observation_spec(&self) -> Vec<Spec> {
            let spec = Spec::Dict(btreemap! {
                "RGB".to_string() => Spec::array("RGB", &[2, 2, 3], DType::U8),
                "WORLD.RGB".to_string() => Spec::array("WORLD.RGB", &[4, 4, 3], DType::U8),
            });
            vec![spec.clone(), spec]
        }

        fn action_spec(&self) -> Vec<Spec> {
            let spec = Spec::Dict(btreemap! {
                "move".to_string() => Spec::bounded_int("move", 0, 4),
            });
            vec![spec.clone(), spec]
        }

        fn reset(&mut self) -> anyhow::Result<JointTimeStep> {
            self.steps = 0;
            Ok(self.timestep(StepType::First))
        }

        fn step(&mut self, actions: &[PlayerAction]) -> anyhow::Result<JointTimeStep> {
            if self.fail {
                bail!("engine exploded");
            }
            self.steps += 1;
            self.seen.push(actions.to_vec());
            let step_type = if self.steps >= self.length {
                StepType::Last
            } else {
                StepType::Mid
            };
            Ok(self.timestep(step_type))
        }

        fn events(&mut self) -> Vec<Event> {
            if self.steps == 2 {
                vec![Event {
                    name: "delivered".to_string(),
                    payload: serde_json::json!({ "player": 1 }),
                }]
            } else {
                vec![]
            }
        }
    }

    fn actions(moves: &[(&str, i64)]) -> FxHashMap<String, PlayerAction> {
        moves
            .iter()
            .map(|(id, m)| (id.to_string(), btreemap! { "move".to_string() => *m }))
            .collect()
    }

    #[test]
    fn test_reset_drops_world_keys() {
        let mut env = MultiAgentEnv::new(Scripted::new(3));
        let observations = env.reset().unwrap();
        assert_eq!(
            observations.keys().collect::<Vec<_>>(),
            vec!["agent_0", "agent_1"]
        );
        for observation in observations.values() {
            assert_eq!(observation.keys().collect::<Vec<_>>(), vec!["RGB"]);
        }
    }

    #[test]
    fn test_step_orders_actions_by_agent_index() {
        let mut env = MultiAgentEnv::new(Scripted::new(3));
        env.reset().unwrap();
        let step = env
            .step(&actions(&[("agent_1", 4), ("agent_0", 2)]))
            .unwrap();
        assert_eq!(env.inner().seen[0][0]["move"], 2);
        assert_eq!(env.inner().seen[0][1]["move"], 4);
        assert_eq!(step.rewards["agent_0"], 1.0);
        assert_eq!(step.rewards["agent_1"], 0.0);
        assert_eq!(step.observations.len(), 2);
    }

    #[test]
    fn test_done_only_on_last_step() {
        let mut env = MultiAgentEnv::new(Scripted::new(2));
        env.reset().unwrap();
        let moves = actions(&[("agent_0", 0), ("agent_1", 0)]);
        let first = env.step(&moves).unwrap();
        assert_eq!(first.dones, btreemap! { ALL_DONE_KEY.to_string() => false });
        assert!(first.infos.is_empty());
        let last = env.step(&moves).unwrap();
        assert_eq!(last.dones, btreemap! { ALL_DONE_KEY.to_string() => true });
        assert_eq!(last.infos[COMMON_INFO_KEY][0]["name"], "delivered");
        assert_eq!(last.infos[COMMON_INFO_KEY][0]["payload"]["player"], 1);
    }

    #[test]
    fn test_missing_action() {
        let mut env = MultiAgentEnv::new(Scripted::new(2));
        env.reset().unwrap();
        match env.step(&actions(&[("agent_0", 1)])) {
            Err(Error::MissingAction(e)) => assert_eq!(e.agent_id, "agent_1"),
            other => panic!("expected a missing action, got {other:?}"),
        }
        assert!(env.inner().seen.is_empty());
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let mut env = MultiAgentEnv::new(Scripted::new(2));
        env.reset().unwrap();
        env.env.fail = true;
        match env.step(&actions(&[("agent_0", 1), ("agent_1", 1)])) {
            Err(Error::Engine(e)) => assert_eq!(e.to_string(), "engine exploded"),
            other => panic!("expected an engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_player_spaces() {
        let env = MultiAgentEnv::new(Scripted::new(2));
        match env.single_player_observation_space().unwrap() {
            Space::Dict(entries) => {
                assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["RGB"])
            }
            other => panic!("expected a dict, got {other:?}"),
        }
        match env.single_player_action_space().unwrap() {
            Space::Dict(entries) => assert!(entries.contains_key("move")),
            other => panic!("expected a dict, got {other:?}"),
        }
        assert_eq!(env.num_agents(), 2);
        assert_eq!(env.agent_ids(), &["agent_0", "agent_1"]);
    }

    struct Unpopulated;

    impl Substrate for Unpopulated {
        fn num_players(&self) -> usize {
            0
        }

        fn observation_spec(&self) -> Vec<Spec> {
            vec![]
        }

        fn action_spec(&self) -> Vec<Spec> {
            vec![]
        }

        fn reset(&mut self) -> anyhow::Result<JointTimeStep> {
            bail!("no players")
        }

        fn step(&mut self, _actions: &[PlayerAction]) -> anyhow::Result<JointTimeStep> {
            bail!("no players")
        }
    }

    #[test]
    fn test_spaces_without_players() {
        let env = MultiAgentEnv::new(Unpopulated);
        assert_eq!(env.num_agents(), 0);
        for result in [
            env.single_player_observation_space(),
            env.single_player_action_space(),
        ] {
            assert!(matches!(
                result,
                Err(Error::Configuration(ConfigurationError::InvalidPlayerCount { count: 0, .. }))
            ));
        }
    }
}
