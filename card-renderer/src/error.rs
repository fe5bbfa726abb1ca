//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while loading, compositing or exporting a card.
///
/// Every variant is terminal for the single export attempt that raised it;
/// editor state is never touched by a failed export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable base image: none was loaded, or it failed to decode.
    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Compositing or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
