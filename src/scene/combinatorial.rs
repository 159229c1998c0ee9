//! State enumeration for objects whose state is the contents of several slots.

/// One enumerated state of a [`MultiSlotContainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotState {
    pub state: String,
    pub sprite: String,
    /// Number of leading filled slots, which selects the fill sprite.
    pub fill: usize,
}

/// A container with `slots` ordered slots, each holding one of `options`.
///
/// `options[0]` is the empty option. The states are the cartesian product of
/// the slot contents, slot 1 varying slowest, followed by one terminal state.
#[derive(Debug, Clone, Copy)]
pub struct MultiSlotContainer<'a> {
    pub name: &'a str,
    pub sprite_base: &'a str,
    pub slots: usize,
    pub options: &'a [&'a str],
}

impl<'a> MultiSlotContainer<'a> {
    pub fn num_states(&self) -> usize {
        self.options.len().pow(self.slots as u32) + 1
    }

    pub fn initial_state(&self) -> String {
        self.product_name(self.name, &vec![0; self.slots])
    }

    pub fn terminal_state(&self) -> SlotState {
        SlotState {
            state: format!("{}_cooked", self.name),
            sprite: format!("{}_cooked", self.sprite_base),
            fill: self.slots,
        }
    }

    pub fn states(&self) -> Vec<SlotState> {
        let product = self.options.len().pow(self.slots as u32);
        let mut states = Vec::with_capacity(product + 1);
        let mut digits = vec![0; self.slots];
        for i in 0..product {
            let mut rest = i;
            for slot in (0..self.slots).rev() {
                digits[slot] = rest % self.options.len();
                rest /= self.options.len();
            }
            states.push(SlotState {
                state: self.product_name(self.name, &digits),
                sprite: self.product_name(self.sprite_base, &digits),
                fill: digits.iter().position(|d| *d == 0).unwrap_or(self.slots),
            });
        }
        states.push(self.terminal_state());
        states
    }

    fn product_name(&self, base: &str, digits: &[usize]) -> String {
        let mut name = base.to_string();
        for d in digits {
            name.push('_');
            name.push_str(self.options[*d]);
        }
        name
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    const POT: MultiSlotContainer = MultiSlotContainer {
        name: "cooking_pot",
        sprite_base: "CookingPot",
        slots: 3,
        options: &["empty", "tomato"],
    };

    #[test]
    fn test_state_count() {
        assert_eq!(POT.states().len(), 9);
        assert_eq!(POT.num_states(), 9);
        let two = MultiSlotContainer {
            options: &["empty", "tomato", "onion"],
            slots: 2,
            ..POT
        };
        assert_eq!(two.states().len(), 10);
    }

    #[test]
    fn test_sprite_names_unique() {
        let states = POT.states();
        let sprites: HashSet<_> = states.iter().map(|s| s.sprite.as_str()).collect();
        assert_eq!(sprites.len(), states.len());
    }

    #[test]
    fn test_order_and_fill() {
        let states = POT.states();
        assert_eq!(states[0].state, "cooking_pot_empty_empty_empty");
        assert_eq!(states[0].fill, 0);
        assert_eq!(states[1].state, "cooking_pot_empty_empty_tomato");
        assert_eq!(states[1].fill, 0);
        assert_eq!(states[4].sprite, "CookingPot_tomato_empty_empty");
        assert_eq!(states[4].fill, 1);
        assert_eq!(states[6].state, "cooking_pot_tomato_tomato_empty");
        assert_eq!(states[6].fill, 2);
        assert_eq!(states[7].fill, 3);
        assert_eq!(states[8].state, "cooking_pot_cooked");
        assert_eq!(states[8].sprite, "CookingPot_cooked");
        assert_eq!(states[8].fill, 3);
        assert_eq!(POT.initial_state(), states[0].state);
    }
}
