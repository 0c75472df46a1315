//! Error types for the narrative engine.

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while driving a story.
///
/// Condition and effect failures never show up here; they are absorbed by
/// the evaluator and the applicator. What remains are content problems found
/// at load time, storage failures, and calls made in the wrong phase.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The story content is invalid.
    #[error(transparent)]
    Content(#[from] fw_core::ContentError),

    /// A scene id that the graph does not contain.
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    /// The choice exists but its conditions no longer hold.
    #[error("choice no longer available: {0}")]
    NoLongerAvailable(String),

    /// The current scene has no choice with this id.
    #[error("choice not found: {0}")]
    ChoiceNotFound(String),

    /// Saving or loading failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// No scene is waiting for a choice.
    #[error("no active scene")]
    NoActiveScene,
}
