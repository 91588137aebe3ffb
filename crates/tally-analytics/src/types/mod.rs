pub mod requests;
pub mod responses;

use sea_orm::DbErr;
use tally_core::DateKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Feature flags selecting which tracking dimensions are active
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingConfig {
    /// Split view and click counters by `web`/`mobile` channel
    pub channels: bool,
    /// Open a session per page view and accept `/track-time` exits
    pub sessions: bool,
}

/// Result of recording a page view
#[derive(Debug, Clone)]
pub struct PageViewOutcome {
    pub date: DateKey,
    pub session_id: Option<String>,
    pub average_duration: Option<i64>,
}
