//! Error types for Aria

use thiserror::Error;

/// The main error type for Aria operations
#[derive(Debug, Error)]
pub enum AriaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Service contract violation: {0}")]
    ContractViolation(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Generation failed: {0}")]
    RemoteFailure(String),

    #[error("Generation timed out after {0:.0} seconds")]
    Timeout(f64),

    #[error("A generation job is already in flight")]
    JobInFlight,

    #[error("Preset error: {0}")]
    PresetError(String),

    #[error("Audio error: {0}")]
    AudioError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Aria operations
pub type Result<T> = std::result::Result<T, AriaError>;

impl From<toml::de::Error> for AriaError {
    fn from(err: toml::de::Error) -> Self {
        AriaError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for AriaError {
    fn from(err: toml::ser::Error) -> Self {
        AriaError::TomlSerError(err.to_string())
    }
}
