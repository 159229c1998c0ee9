use std::ops::RangeInclusive;

use super::SubAction;

/// A source of actions for one player.
pub trait Agent {
    /// Chooses a value for the sub-action `action` from `range`.
    fn act_dyn(&mut self, action: &str, range: RangeInclusive<i64>) -> i64;

    fn act<A: SubAction>(&mut self) -> A
    where
        Self: Sized,
    {
        let value = self.act_dyn(A::name(), A::range());
        A::from_value(value).unwrap_or_else(|| A::from_index(0))
    }

    fn game_over(&mut self) {}
}
