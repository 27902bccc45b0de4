//! Error types for the gesture engine.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON settings or recording could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML settings could not be (de)serialized
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `X11` window system operation failed
    #[error("X11 error: {0}")]
    X11(String),

    /// A key binding string could not be parsed
    #[error("Key binding error: {0}")]
    KeyBinding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Frame source could not be opened or stopped delivering frames
    #[error("Frame source error: {0}")]
    Source(String),

    /// Synthetic key press or release failed
    #[error("Key injection error: {0}")]
    Injection(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
