use std::ops::RangeInclusive;

/// One categorical component of a player's action, e.g. `move` or `turn`.
/// Can be derived for fieldless enums.
///
/// Variants map to the consecutive values `minimum()..=maximum()`.
///
/// # Example
/// ```rust
/// use substrate_gym_rs::agent::SubAction;
///
/// #[derive(SubAction)]
/// #[sub_action(minimum = "-1")]
/// enum Turn { Left, Straight, Right }
///
/// assert_eq!(Turn::Left.value(), -1);
/// assert_eq!(Turn::name(), "turn");
/// ```
pub trait SubAction: Sized {
    /// Instantiates a sub-action from its 0-based index.
    fn from_index(index: u64) -> Self;
    /// Converts a sub-action to its 0-based index.
    fn index(&self) -> u64;
    /// Returns the number of possible values.
    fn num_values() -> u64;
    /// Returns the key of the sub-action in a player's action.
    fn name() -> &'static str;
    /// Returns human readable labels corresponding to each value.
    fn labels() -> &'static [&'static str];
    /// Returns the value of the first variant.
    fn minimum() -> i64;

    fn maximum() -> i64 {
        Self::minimum() + Self::num_values() as i64 - 1
    }

    fn range() -> RangeInclusive<i64> {
        Self::minimum()..=Self::maximum()
    }

    /// The value sent to the engine.
    fn value(&self) -> i64 {
        Self::minimum() + self.index() as i64
    }

    /// Instantiates a sub-action from an engine value, `None` when out of range.
    fn from_value(value: i64) -> Option<Self> {
        if Self::range().contains(&value) {
            Some(Self::from_index((value - Self::minimum()) as u64))
        } else {
            None
        }
    }
}
