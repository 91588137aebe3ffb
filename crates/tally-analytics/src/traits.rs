use async_trait::async_trait;
use tally_core::DateKey;

use crate::channel::Channel;
use crate::types::responses::DailyStatRow;
use crate::types::{PageViewOutcome, TrackingError};

/// Trait defining the tracking operations exposed over HTTP
#[async_trait]
pub trait Tracking: Send + Sync {
    /// Count a page view for today, opening a session when session
    /// tracking is active
    async fn record_page_view(
        &self,
        channel: Option<Channel>,
    ) -> Result<PageViewOutcome, TrackingError>;

    /// Count a click for today and append it to the click log
    async fn record_click(
        &self,
        button_id: &str,
        channel: Option<Channel>,
    ) -> Result<DateKey, TrackingError>;

    /// Close a session at the current instant; returns the duration in
    /// fractional seconds
    async fn close_session(&self, session_id: &str) -> Result<f64, TrackingError>;

    /// Aggregate per-date stats, inclusive of both range ends; a missing
    /// range means all dates
    async fn get_stats(
        &self,
        range: Option<(DateKey, DateKey)>,
        channel: Option<Channel>,
    ) -> Result<Vec<DailyStatRow>, TrackingError>;
}
