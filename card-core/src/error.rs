//! Error types for editor and session operations.

use thiserror::Error;

/// Result type for card operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur in card operations.
///
/// There is no unknown-id variant: store operations on a stale id are no-ops.
#[derive(Debug, Error)]
pub enum CardError {
    /// A color outside the fixed palette was requested.
    #[error("Color not in palette: {0}")]
    InvalidColor(String),

    /// Editing was attempted while the session is not in the editing phase.
    #[error("Editing is locked while the session is {0}")]
    EditingLocked(String),

    /// A generation request is already outstanding.
    #[error("A generation request is already in progress")]
    GenerationInProgress,

    /// Generation was requested before a source photo was provided.
    #[error("No source image has been provided")]
    NoSourceImage,

    /// The generation collaborator failed.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The greeting catalog is malformed.
    #[error("Invalid greeting catalog: {0}")]
    Catalog(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
