//! Scenario loading errors.

/// Errors that can occur while loading a scenario and building its bodies.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the scenario file from disk.
    #[error("failed to read scenario: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the scenario file to disk.
    #[error("failed to write scenario: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to serialize the scenario to RON.
    #[error("failed to serialize scenario: {0}")]
    Serialize(#[source] ron::Error),

    /// Failed to parse RON content.
    #[error("failed to parse scenario: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// A color that isn't `rrggbb` hex.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// Orbital elements that don't describe an ellipse.
    #[error("invalid orbital elements for {body}: {reason}")]
    InvalidElements { body: String, reason: String },

    /// A body refers to another body that isn't in the scenario.
    #[error("{body} refers to unknown body {parent}")]
    UnknownParent { body: String, parent: String },

    /// Following `relative_to` from this body leads back to it.
    #[error("{0} is relative to itself through its parents")]
    CyclicParent(String),

    /// Two bodies share a name.
    #[error("duplicate body name: {0}")]
    DuplicateBody(String),

    /// The scenario has nothing in it.
    #[error("scenario has no bodies")]
    NoBodies,
}
