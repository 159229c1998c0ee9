//! Human play: one player driven from an input device, the others by agents.

mod control;
pub mod input;
mod render;

pub use control::{
    run_episode, ActionReader, ControlLoop, EpisodeReport, LoopState, PlayOptions, Players,
    TextDisplayFn, VerboseFn,
};
pub use input::{
    action_map_for, clean_up_action_map, default_action_map, ActionMap, InputDevice, InputFrame,
    Key, PressedKeys,
};
pub use render::{LogRenderer, NullRenderer, Renderer};
