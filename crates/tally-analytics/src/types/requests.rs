use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body for `POST /pageview`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageViewRequest {
    /// Channel the view came from (`web` or `mobile`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Body for `POST /click`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClickRequest {
    #[serde(default)]
    pub button_id: Option<String>,
    /// Channel the click came from (`web` or `mobile`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Body for `POST /track-time`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackTimeRequest {
    pub session_id: String,
    /// Client-reported duration; ignored, the stored entry time is authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Query parameters for `GET /stats`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub channel: Option<String>,
}

/// Query parameters for `GET /download`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DownloadQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub channel: Option<String>,
}
