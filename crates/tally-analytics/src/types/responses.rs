use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageViewResponse {
    pub message: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackTimeResponse {
    pub message: String,
    pub session_id: String,
    /// Seconds between session entry and exit
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClickResponse {
    pub message: String,
    pub date: String,
}

/// One aggregated row per calendar date
///
/// Counters that were never incremented for the date are absent rather
/// than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyStatRow {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_views: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_views: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_views: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_clicks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_clicks: Option<i64>,
    /// Average closed-session duration for the date, rounded to whole seconds
    pub average_duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub stats: Vec<DailyStatRow>,
}
