//! Error types.
//!
//! Every error here is a configuration or programming defect, none is
//! transient. Engine failures travel as [`anyhow::Error`] and are wrapped
//! transparently by [`Error::Engine`] so callers can still downcast them.

/// Malformed or inconsistent scene, template or substrate data.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The ASCII map has no rows.
    #[error("ascii map is empty")]
    EmptyGrid,

    /// A row of the ASCII map has a different width than the first row.
    #[error("ragged ascii map: row {row} has width {found}, expected {expected}")]
    RaggedGrid {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// A non-background character has no template mapped to it.
    #[error("character {character:?} at ({row}, {column}) has no registered prefab")]
    UnknownCharacter {
        /// The unmapped character.
        character: char,
        /// Zero-based row of the first occurrence.
        row: usize,
        /// Zero-based column of the first occurrence.
        column: usize,
    },

    /// A template name that is not in the prefab library.
    #[error("prefab {0:?} is not in the prefab library")]
    MissingPrefab(String),

    /// A sprite name that is neither in the shape library nor declared by the template.
    #[error("prefab {prefab:?} references undeclared sprite {sprite:?}")]
    MissingSprite {
        /// Template (or library) that made the reference.
        prefab: String,
        /// The missing sprite name.
        sprite: String,
    },

    /// A palette name that is not in the shape library.
    #[error("palette {0:?} is not in the shape library")]
    MissingPalette(String),

    /// The initial state is not one of the declared states.
    #[error("prefab {prefab:?} starts in undeclared state {state:?}")]
    UnknownInitialState {
        /// Template name.
        prefab: String,
        /// The offending initial state.
        state: String,
    },

    /// Appearance name, shape and palette lists disagree in length.
    #[error("prefab {prefab:?} has a malformed appearance: {reason}")]
    MalformedAppearance {
        /// Template name.
        prefab: String,
        /// What is inconsistent.
        reason: String,
    },

    /// A template has no `StateManager` or `Transform` component.
    #[error("prefab {prefab:?} is missing a {component} component")]
    MissingComponent {
        /// Template name.
        prefab: String,
        /// Component kind that is required.
        component: &'static str,
    },

    /// A bound position lies outside the grid.
    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Column.
        x: i64,
        /// Row.
        y: i64,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// A player count the substrate cannot seat.
    #[error("invalid player count {count}: {reason}")]
    InvalidPlayerCount {
        /// Requested count.
        count: usize,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No substrate is registered under this name.
    #[error("unknown substrate {0:?}")]
    UnknownSubstrate(String),

    /// Settings overrides did not deserialize into the level settings.
    #[error("invalid settings override: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}

/// A spec node the space converter cannot represent.
#[derive(Debug, thiserror::Error)]
#[error("unsupported spec node: {node}")]
pub struct UnsupportedSpecError {
    /// Description of the offending node.
    pub node: String,
}

/// The action dictionary passed to the adapter has no entry for an agent.
#[derive(Debug, thiserror::Error)]
#[error("no action provided for {agent_id}")]
pub struct MissingActionError {
    /// Canonical id of the agent without an action.
    pub agent_id: String,
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// See [`ConfigurationError`].
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// See [`UnsupportedSpecError`].
    #[error(transparent)]
    UnsupportedSpec(#[from] UnsupportedSpecError),

    /// See [`MissingActionError`].
    #[error(transparent)]
    MissingAction(#[from] MissingActionError),

    /// Raised by the engine and passed through unmodified.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
