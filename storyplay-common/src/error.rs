//! Error types for storyplay
//!
//! Defines workspace-wide error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for storyplay
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed chapter data detected at catalog construction
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catalog file loading or parsing errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Voice-over playback errors (non-fatal to narration)
    #[error("Audio error: {0}")]
    Audio(String),

    /// Operation attempted on a disposed engine
    #[error("Engine disposed")]
    Disposed,

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the storyplay Error
pub type Result<T> = std::result::Result<T, Error>;
