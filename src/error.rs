use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Lead not found: #{0}")]
    LeadNotFound(i64),

    #[error("Rate limit reached: wait {minutes_remaining} minute(s) before the next run")]
    RateLimited { minutes_remaining: i64 },

    #[error("A sync run is already in progress")]
    SyncInProgress,

    #[error("Missing configuration: {0}")]
    ConfigMissing(String),
}
