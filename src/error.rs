use thiserror::Error;

/// Main error type for the stats collector
#[derive(Error, Debug)]
pub enum StatsError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Upstream data errors
    #[error("Source unavailable for {player}: {reason}")]
    SourceUnavailable { player: String, reason: String },

    #[error("Malformed record for {player} (page {page}, entry {index}): {reason}")]
    MalformedRecord {
        player: String,
        page: u32,
        index: usize,
        reason: String,
    },

    // Report delivery errors
    #[error("Report delivery failed: {0}")]
    Delivery(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StatsError {
    /// Build a `SourceUnavailable` error for a player
    pub fn source_unavailable(player: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        StatsError::SourceUnavailable {
            player: player.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for StatsError
pub type Result<T> = std::result::Result<T, StatsError>;
