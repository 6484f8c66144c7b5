//! Error types for ghost-typewriter.

use thiserror::Error;

/// Errors raised while loading configuration or parsing colours.
///
/// Driver operations themselves never fail; these only surface at the
/// edges where external input is read.
#[derive(Debug, Error)]
pub enum TypewriterError {
    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A colour string that ratatui could not parse.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Result type for ghost-typewriter operations.
pub type Result<T> = std::result::Result<T, TypewriterError>;
