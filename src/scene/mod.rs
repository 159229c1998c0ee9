//! Declarative description of a level: sprites, prefabs, and the compiler that
//! places them on an ASCII map.

mod avatar;
mod combinatorial;
mod compiler;
mod grid;
mod prefab;
mod progress;
pub mod shapes;

pub use avatar::{AvatarTemplate, BeamTemplate, SelfSprite};
pub use combinatorial::{MultiSlotContainer, SlotState};
pub use compiler::{
    AllOf, CharPrefab, CharPrefabMap, Entity, SceneCompiler, SceneDescription, Simulation,
    INVENTORY_PREFAB, PROGRESS_PREFAB,
};
pub use grid::{AsciiMap, BACKGROUND};
pub use prefab::{
    ActionRange, AdditionalSprites, Animation, Appearance, AppleGrow, Avatar, BeamBlocker,
    Cleaner, Component, Container, CookingPot, DirtCleaning, DirtSpawner, DirtTracker, Edible,
    InteractBeam, Inventory, LoadingBarVisualiser, LocationObserver, Orientation, Position,
    Prefab, PrefabLibrary, Receiver, RenderMode, RiverMonitor, StateConfig, StateManager, Taste,
    Transform, View, Zapper,
};
pub use progress::ProgressBar;
