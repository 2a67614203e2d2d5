use thiserror::Error;

/// Unified result type for the RS9000 core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors surfaced by the coordination core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("subscription `{0}` already registered")]
    DuplicateSubscription(String),
    #[error("overlay encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("overlay request decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Fatal misconfiguration. Detected at startup or at the first conversion;
/// never recovered from by picking a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("units `{0}` not supported")]
    UnsupportedUnits(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
