pub mod agent;
pub mod bots;
pub mod error;
pub mod low_level;
pub mod play;
pub mod scene;
pub mod space;
pub mod substrates;
