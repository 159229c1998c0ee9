use std::collections::BTreeMap;

use crossbeam_channel::Receiver;
use rustc_hash::FxHashSet;

use crate::agent::SubAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Q,
    E,
    Z,
    X,
    Delete,
    PageDown,
    Space,
    Tab,
    Escape,
    LeftShift,
    RightShift,
    LeftControl,
    Digit(u8),
}

impl Key {
    /// The key a typed character stands for.
    pub fn from_char(c: char) -> Option<Key> {
        let key = match c.to_ascii_lowercase() {
            'w' => Key::W,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            'q' => Key::Q,
            'e' => Key::E,
            'z' => Key::Z,
            'x' => Key::X,
            ' ' => Key::Space,
            '\t' => Key::Tab,
            c @ '0'..='9' => Key::Digit(c as u8 - b'0'),
            _ => return None,
        };
        Some(key)
    }
}

pub type PressedKeys = FxHashSet<Key>;

/// What the input device reported since the previous poll.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub quit: bool,
    pub switch_player: bool,
    pub pressed: PressedKeys,
}

impl InputFrame {
    /// A frame holding `keys`. Tab switches player and Escape quits.
    pub fn keys(keys: impl IntoIterator<Item = Key>) -> InputFrame {
        let pressed: PressedKeys = keys.into_iter().collect();
        InputFrame {
            quit: pressed.contains(&Key::Escape),
            switch_player: pressed.contains(&Key::Tab),
            pressed,
        }
    }

    /// Parses one line typed on a terminal. `quit` ends the episode.
    pub fn parse_line(line: &str) -> InputFrame {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim() == "quit" {
            return InputFrame {
                quit: true,
                ..Default::default()
            };
        }
        InputFrame::keys(line.chars().filter_map(Key::from_char))
    }

    fn merge(&mut self, other: InputFrame) {
        self.quit |= other.quit;
        self.switch_player |= other.switch_player;
        self.pressed.extend(other.pressed);
    }
}

pub trait InputDevice {
    /// Called once per tick.
    fn poll(&mut self) -> InputFrame;
}

impl<F: FnMut() -> InputFrame> InputDevice for F {
    fn poll(&mut self) -> InputFrame {
        self()
    }
}

/// Input forwarded from another thread. Frames queued between two polls are merged.
pub struct ChannelInput {
    frames: Receiver<InputFrame>,
}

impl ChannelInput {
    pub fn new(frames: Receiver<InputFrame>) -> Self {
        ChannelInput { frames }
    }
}

impl InputDevice for ChannelInput {
    fn poll(&mut self) -> InputFrame {
        let mut frame = InputFrame::default();
        for pending in self.frames.try_iter() {
            frame.merge(pending);
        }
        frame
    }
}

/// Reads the value of one sub-action from the pressed keys.
pub type ActionFn = Box<dyn Fn(&PressedKeys) -> i64>;
/// Sub-action name to the function reading it.
pub type ActionMap = BTreeMap<String, ActionFn>;

#[derive(SubAction, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Noop,
    Forward,
    Right,
    Backward,
    Left,
}

#[derive(SubAction, Debug, Clone, Copy, PartialEq, Eq)]
#[sub_action(minimum = "-1")]
pub enum Turn {
    Left,
    Straight,
    Right,
}

#[derive(SubAction, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interact {
    Noop,
    Interact,
}

#[derive(SubAction, Debug, Clone, Copy, PartialEq, Eq)]
#[sub_action(name = "fireZap")]
pub enum FireZap {
    Noop,
    Fire,
}

#[derive(SubAction, Debug, Clone, Copy, PartialEq, Eq)]
#[sub_action(name = "fireClean")]
pub enum FireClean {
    Noop,
    Fire,
}

fn any(keys: &PressedKeys, of: &[Key]) -> bool {
    of.iter().any(|k| keys.contains(k))
}

pub fn get_direction_pressed(keys: &PressedKeys) -> i64 {
    let direction = if any(keys, &[Key::Up, Key::W]) {
        Move::Forward
    } else if any(keys, &[Key::Right, Key::D]) {
        Move::Right
    } else if any(keys, &[Key::Down, Key::S]) {
        Move::Backward
    } else if any(keys, &[Key::Left, Key::A]) {
        Move::Left
    } else {
        Move::Noop
    };
    direction.value()
}

pub fn get_turn_pressed(keys: &PressedKeys) -> i64 {
    let turn = if any(keys, &[Key::Delete, Key::Q]) {
        Turn::Left
    } else if any(keys, &[Key::PageDown, Key::E]) {
        Turn::Right
    } else {
        Turn::Straight
    };
    turn.value()
}

pub fn get_space_key_pressed(keys: &PressedKeys) -> i64 {
    keys.contains(&Key::Space) as i64
}

/// The lowest digit pressed, -1 when none is.
pub fn get_key_number_pressed(keys: &PressedKeys) -> i64 {
    (0..=9)
        .find(|d| keys.contains(&Key::Digit(*d)))
        .map_or(-1, |d| d as i64)
}

/// Reads 1 while `key` is held, else 0.
pub fn key_flag(key: Key) -> ActionFn {
    Box::new(move |keys| keys.contains(&key) as i64)
}

/// WASD/arrows to move, Q/E to turn, space to interact.
pub fn default_action_map() -> ActionMap {
    let mut map = ActionMap::new();
    map.insert(Move::name().to_string(), Box::new(get_direction_pressed) as ActionFn);
    map.insert(Turn::name().to_string(), Box::new(get_turn_pressed));
    map.insert(Interact::name().to_string(), Box::new(get_space_key_pressed));
    map
}

/// Left shift and X both clean, since a terminal cannot send a bare shift.
pub fn get_clean_pressed(keys: &PressedKeys) -> i64 {
    let clean = if any(keys, &[Key::LeftShift, Key::X]) {
        FireClean::Fire
    } else {
        FireClean::Noop
    };
    clean.value()
}

/// WASD/arrows to move, Q/E to turn, space to zap, left shift or X to clean.
pub fn clean_up_action_map() -> ActionMap {
    let mut map = ActionMap::new();
    map.insert(Move::name().to_string(), Box::new(get_direction_pressed) as ActionFn);
    map.insert(Turn::name().to_string(), Box::new(get_turn_pressed));
    map.insert(FireZap::name().to_string(), key_flag(Key::Space));
    map.insert(FireClean::name().to_string(), Box::new(get_clean_pressed));
    map
}

/// The key bindings of the named substrate.
pub fn action_map_for(substrate: &str) -> ActionMap {
    match substrate {
        "clean_up" => clean_up_action_map(),
        _ => default_action_map(),
    }
}

#[cfg(test)]
mod test {
    use crossbeam_channel::unbounded;

    use super::*;

    fn pressed(keys: &[Key]) -> PressedKeys {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_direction() {
        assert_eq!(get_direction_pressed(&pressed(&[])), 0);
        assert_eq!(get_direction_pressed(&pressed(&[Key::W])), 1);
        assert_eq!(get_direction_pressed(&pressed(&[Key::Right])), 2);
        assert_eq!(get_direction_pressed(&pressed(&[Key::S])), 3);
        assert_eq!(get_direction_pressed(&pressed(&[Key::A])), 4);
        assert_eq!(get_direction_pressed(&pressed(&[Key::A, Key::Up])), 1);
    }

    #[test]
    fn test_turn_and_fire() {
        assert_eq!(get_turn_pressed(&pressed(&[Key::Q])), -1);
        assert_eq!(get_turn_pressed(&pressed(&[Key::E])), 1);
        assert_eq!(get_turn_pressed(&pressed(&[])), 0);
        assert_eq!(get_space_key_pressed(&pressed(&[Key::Space])), 1);
        assert_eq!(key_flag(Key::LeftShift)(&pressed(&[Key::LeftShift])), 1);
        assert_eq!(get_key_number_pressed(&pressed(&[Key::Digit(7), Key::Digit(3)])), 3);
        assert_eq!(get_key_number_pressed(&pressed(&[])), -1);
    }

    #[test]
    fn test_default_action_map() {
        let map = default_action_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["interact", "move", "turn"]);
        let keys = pressed(&[Key::D, Key::E, Key::Space]);
        assert_eq!(map["move"](&keys), 2);
        assert_eq!(map["turn"](&keys), 1);
        assert_eq!(map["interact"](&keys), 1);
    }

    #[test]
    fn test_clean_up_action_map() {
        let map = action_map_for("clean_up");
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec!["fireClean", "fireZap", "move", "turn"]
        );
        let keys = pressed(&[Key::W, Key::Space]);
        assert_eq!(map["move"](&keys), 1);
        assert_eq!(map["fireZap"](&keys), 1);
        assert_eq!(map["fireClean"](&keys), 0);
        assert_eq!(map["fireClean"](&pressed(&[Key::X])), 1);
        assert_eq!(map["fireClean"](&pressed(&[Key::LeftShift])), 1);
        assert!(action_map_for("collaborative_cooking_passable").contains_key("interact"));
    }

    #[test]
    fn test_parse_line() {
        let frame = InputFrame::parse_line("wq\t\n");
        assert!(frame.switch_player);
        assert!(!frame.quit);
        assert_eq!(frame.pressed, pressed(&[Key::W, Key::Q, Key::Tab]));
        assert!(InputFrame::parse_line("quit\n").quit);
    }

    #[test]
    fn test_channel_input_merges_pending() {
        let (tx, rx) = unbounded();
        let mut input = ChannelInput::new(rx);
        assert!(input.poll().pressed.is_empty());
        tx.send(InputFrame::keys([Key::W])).unwrap();
        tx.send(InputFrame::keys([Key::Tab])).unwrap();
        let frame = input.poll();
        assert!(frame.switch_player);
        assert!(frame.pressed.contains(&Key::W));
        assert!(input.poll().pressed.is_empty());
    }
}
