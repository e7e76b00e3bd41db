//! Engine error type.

use thiserror::Error;

/// Errors surfaced by the swarm traffic engine.
#[derive(Debug, Error)]
pub enum SwarmError {
    /// The action configuration was rejected when starting.
    #[error("configuration error: {0}")]
    Config(String),

    /// The action was stepped before it was started.
    #[error("step called on an action that was never started")]
    NotStarted,
}

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SwarmError>;
