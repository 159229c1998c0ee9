use std::ops::RangeInclusive;

use super::{Agent, RandomAgent};

/// Chooses a sub-action value given the 0-based player index and the sub-action name.
pub type Script = Box<dyn FnMut(usize, &str) -> i64>;

pub enum AnyAgent {
    Random(RandomAgent),
    /// Always picks the no-op value.
    Noop,
    Scripted { player: usize, script: Script },
}

impl AnyAgent {
    pub fn random() -> AnyAgent {
        AnyAgent::Random(RandomAgent::default())
    }

    pub fn random_seeded(seed: u64) -> AnyAgent {
        AnyAgent::Random(RandomAgent::from_seed(seed))
    }

    pub fn noop() -> AnyAgent {
        AnyAgent::Noop
    }

    pub fn scripted(player: usize, script: impl FnMut(usize, &str) -> i64 + 'static) -> AnyAgent {
        AnyAgent::Scripted {
            player,
            script: Box::new(script),
        }
    }
}

/// The no-op value of a sub-action: 0 when allowed, else the bound closest to 0.
pub fn noop_value(range: &RangeInclusive<i64>) -> i64 {
    0i64.clamp(*range.start(), *range.end())
}

impl Agent for AnyAgent {
    fn act_dyn(&mut self, action: &str, range: RangeInclusive<i64>) -> i64 {
        match self {
            AnyAgent::Random(agent) => agent.act_dyn(action, range),
            AnyAgent::Noop => noop_value(&range),
            AnyAgent::Scripted { player, script } => {
                script(*player, action).clamp(*range.start(), *range.end())
            }
        }
    }

    fn game_over(&mut self) {
        if let AnyAgent::Random(agent) = self {
            agent.game_over()
        }
    }
}
