//! Error types for everything that touches the filesystem

use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure to read or write settings or the high score
#[derive(Debug, Error)]
pub enum StorageError {
    /// No config/data directory on this platform
    #[error("Could not determine {0} directory")]
    NoDirectory(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// High score file is not valid JSON
    #[error("Invalid high score file: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file is not valid TOML
    #[error("Invalid settings file: {0}")]
    TomlRead(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}
