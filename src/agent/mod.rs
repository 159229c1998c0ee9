//! Per-agent view of a substrate and the agents that act in it.

mod action;
mod agent;
mod any_agent;
mod env;
mod obs;
mod random_agent;

pub use action::SubAction;
pub use agent::Agent;
pub use any_agent::{noop_value, AnyAgent, Script};
pub use env::{agent_id, MultiAgentEnv, MultiAgentStep, ALL_DONE_KEY, COMMON_INFO_KEY};
pub use obs::{is_global_key, remove_world_observations, GLOBAL_KEY_MARKER};
pub use random_agent::RandomAgent;
pub use substrate_gym_derive::SubAction;
