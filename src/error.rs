//! Error types for Skive.

use thiserror::Error;

/// Library-level error type for Skive operations.
#[derive(Error, Debug)]
pub enum SkiveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No valid timestamps found in input")]
    NoValidTimestamps,

    #[error("Could not determine duration of {0}")]
    DurationUnavailable(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Metadata lookup failed: {0}")]
    Lookup(String),

    #[error("Confirmation declined: {0}")]
    ConfirmationDeclined(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Skive operations.
pub type Result<T> = std::result::Result<T, SkiveError>;
