//! The engine boundary: flat key-encoded engine protocol, its joint
//! multi-player view, and the spec tree both of them describe channels with.

mod env;
mod headless;
mod multiplayer;
mod spec;

pub use env::*;
pub use headless::HeadlessEngine;
pub use multiplayer::MultiplayerWrapper;
pub use spec::{DType, Scalar, Spec};
