use crate::types::{requests::*, responses::*};
use crate::{export, Channel, Tracking, TrackingConfig, TrackingError};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tally_core::error_builder::{bad_request, internal_server_error, not_found};
use tally_core::problemdetails::Problem;
use tally_core::DateKey;
use utoipa::OpenApi;

pub struct AppState {
    pub tracking: Arc<dyn Tracking>,
    pub config: TrackingConfig,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        record_page_view,
        track_time,
        record_click,
        get_stats,
        download_stats,
    ),
    components(schemas(
        PageViewRequest,
        ClickRequest,
        TrackTimeRequest,
        PageViewResponse,
        ClickResponse,
        TrackTimeResponse,
        DailyStatRow,
        StatsResponse,
        StatsQuery,
        DownloadQuery,
    )),
    info(
        title = "Tally API",
        description = "API endpoints for recording page views, clicks and visit sessions, \
        and for querying or downloading the aggregated per-date statistics.",
        version = "1.0.0"
    )
)]
pub struct TrackingApiDoc;

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pageview", post(record_page_view))
        .route("/track-time", post(track_time))
        .route("/click", post(record_click))
        .route("/stats", get(get_stats))
        .route("/download", get(download_stats))
}

/// Count a page view for today
#[utoipa::path(
    tag = "Tracking",
    post,
    path = "/pageview",
    request_body = PageViewRequest,
    responses(
        (status = 200, description = "Page view counted", body = PageViewResponse),
        (status = 400, description = "Missing or invalid channel type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn record_page_view(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<PageViewRequest>,
) -> Result<impl IntoResponse, Problem> {
    let channel = required_channel(&app_state.config, request.channel.as_deref())?;

    match app_state.tracking.record_page_view(channel).await {
        Ok(outcome) => Ok(Json(PageViewResponse {
            message: "Page view counted".to_string(),
            date: outcome.date.to_string(),
            session_id: outcome.session_id,
            average_duration: outcome.average_duration,
        })),
        Err(e) => Err(handle_tracking_error(e)),
    }
}

/// Close a session at the current instant
#[utoipa::path(
    tag = "Tracking",
    post,
    path = "/track-time",
    request_body = TrackTimeRequest,
    responses(
        (status = 200, description = "Exit recorded", body = TrackTimeResponse),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn track_time(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<TrackTimeRequest>,
) -> Result<impl IntoResponse, Problem> {
    match app_state.tracking.close_session(&request.session_id).await {
        Ok(duration) => Ok(Json(TrackTimeResponse {
            message: "Exit recorded".to_string(),
            session_id: request.session_id,
            duration,
        })),
        Err(e) => Err(handle_tracking_error(e)),
    }
}

/// Count a button click for today
#[utoipa::path(
    tag = "Tracking",
    post,
    path = "/click",
    request_body = ClickRequest,
    responses(
        (status = 200, description = "Click counted", body = ClickResponse),
        (status = 400, description = "Missing button id or invalid channel type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn record_click(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ClickRequest>,
) -> Result<impl IntoResponse, Problem> {
    let button_id = match request.button_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(bad_request().detail("button_id is required").build()),
    };
    let channel = required_channel(&app_state.config, request.channel.as_deref())?;

    match app_state.tracking.record_click(button_id, channel).await {
        Ok(date) => {
            let message = match channel {
                Some(Channel::Web) => "Web click counted",
                Some(Channel::Mobile) => "Mobile click counted",
                None => "Click counted",
            };
            Ok(Json(ClickResponse {
                message: message.to_string(),
                date: date.to_string(),
            }))
        }
        Err(e) => Err(handle_tracking_error(e)),
    }
}

/// Aggregated per-date statistics
#[utoipa::path(
    tag = "Tracking",
    get,
    path = "/stats",
    params(
        ("start_date" = Option<String>, Query, description = "Range start in format YYYY-MM-DD (inclusive)"),
        ("end_date" = Option<String>, Query, description = "Range end in format YYYY-MM-DD (inclusive)"),
        ("type" = Option<String>, Query, description = "Restrict session durations to one channel: 'web' or 'mobile'")
    ),
    responses(
        (status = 200, description = "Successfully retrieved statistics", body = StatsResponse),
        (status = 400, description = "Invalid date or channel type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_stats(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, Problem> {
    let channel = channel_filter(query.channel.as_deref())?;
    let range = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;

    match app_state.tracking.get_stats(range, channel).await {
        Ok(stats) => Ok(Json(StatsResponse { stats })),
        Err(e) => Err(handle_tracking_error(e)),
    }
}

/// Download the aggregated statistics as CSV
#[utoipa::path(
    tag = "Tracking",
    get,
    path = "/download",
    params(
        ("start_date" = String, Query, description = "Range start in format YYYY-MM-DD (inclusive)"),
        ("end_date" = String, Query, description = "Range end in format YYYY-MM-DD (inclusive)"),
        ("type" = Option<String>, Query, description = "Restrict session durations to one channel: 'web' or 'mobile'")
    ),
    responses(
        (status = 200, description = "CSV attachment with one row per date", content_type = "text/csv"),
        (status = 400, description = "Missing range bound, invalid date or channel type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn download_stats(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, Problem> {
    let (Some(start_date), Some(end_date)) = (query.start_date, query.end_date) else {
        return Err(bad_request()
            .detail("start_date and end_date are required")
            .build());
    };

    let channel = channel_filter(query.channel.as_deref())?;
    let range = parse_range(Some(&start_date), Some(&end_date))?;

    let stats = match app_state.tracking.get_stats(range, channel).await {
        Ok(stats) => stats,
        Err(e) => return Err(handle_tracking_error(e)),
    };

    let fields = if app_state.config.channels {
        export::channel_fields()
    } else {
        export::default_fields()
    };
    // The channel-split export targets spreadsheet locales that need a BOM
    let bom = app_state.config.channels;

    let body = export::render_csv(&stats, &fields, bom).map_err(|e| {
        tracing::error!("CSV rendering failed: {}", e);
        internal_server_error()
            .detail("Failed to render statistics as CSV")
            .build()
    })?;

    let filename = format!("stats_data_{}_to_{}.csv", start_date, end_date);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

/// Resolve the channel for a write. With the channel split active the
/// value is mandatory and must parse; otherwise it is ignored.
fn required_channel(config: &TrackingConfig, raw: Option<&str>) -> Result<Option<Channel>, Problem> {
    if !config.channels {
        return Ok(None);
    }
    match raw {
        Some(value) => match Channel::parse(value) {
            Ok(channel) => Ok(Some(channel)),
            Err(_) => Err(bad_request()
                .detail(format!("Invalid channel type: {}", value))
                .build()),
        },
        None => Err(bad_request().detail("Channel type is required").build()),
    }
}

/// Resolve the optional channel filter on reads
fn channel_filter(raw: Option<&str>) -> Result<Option<Channel>, Problem> {
    match raw {
        Some(value) => Channel::parse(value).map(Some).map_err(|_| {
            bad_request()
                .detail(format!("Invalid channel type: {}", value))
                .build()
        }),
        None => Ok(None),
    }
}

fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<(DateKey, DateKey)>, Problem> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let start: DateKey = start.parse().map_err(invalid_date)?;
            let end: DateKey = end.parse().map_err(invalid_date)?;
            Ok(Some((start, end)))
        }
        (None, None) => Ok(None),
        _ => Err(bad_request()
            .detail("start_date and end_date must be provided together")
            .build()),
    }
}

fn invalid_date(e: tally_core::DateKeyError) -> Problem {
    bad_request().detail(e.to_string()).build()
}

// Helper function to handle TrackingError
pub(super) fn handle_tracking_error(error: TrackingError) -> Problem {
    match error {
        TrackingError::Database(e) => {
            tracing::error!("Database error: {}", e);
            internal_server_error()
                .detail("Database error while recording tracking data")
                .build()
        }
        TrackingError::SessionNotFound(id) => {
            tracing::error!("Session not found: {}", id);
            not_found().detail("Session not found").build()
        }
        TrackingError::InvalidChannel(value) => bad_request()
            .detail(format!("Invalid channel type: {}", value))
            .build(),
        TrackingError::Validation(message) => bad_request().detail(message).build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStatsStore;
    use crate::{StatsStore, TrackingService};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router(config: TrackingConfig) -> Router {
        let store = Arc::new(MemoryStatsStore::new());
        router_with_store(store, config)
    }

    fn router_with_store(store: Arc<MemoryStatsStore>, config: TrackingConfig) -> Router {
        let tracking = Arc::new(TrackingService::new(store, config));
        let state = Arc::new(AppState { tracking, config });
        configure_routes().with_state(state)
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn today() -> String {
        DateKey::from_datetime(chrono::Utc::now()).to_string()
    }

    #[tokio::test]
    async fn pageview_counts_and_reports_date() {
        let app = router(TrackingConfig::default());

        let response = app.oneshot(post_json("/pageview", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Page view counted");
        assert_eq!(body["date"], today());
        assert!(body.get("session_id").is_none());
    }

    #[tokio::test]
    async fn pageview_opens_session_when_configured() {
        let app = router(TrackingConfig {
            channels: false,
            sessions: true,
        });

        let response = app.oneshot(post_json("/pageview", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(body["session_id"].is_string());
        assert_eq!(body["average_duration"], 0);
    }

    #[tokio::test]
    async fn pageview_requires_channel_when_split_is_active() {
        let app = router(TrackingConfig {
            channels: true,
            sessions: false,
        });

        let response = app
            .clone()
            .oneshot(post_json("/pageview", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/pageview", r#"{"type":"tablet"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_channel_does_not_mutate_counters() {
        let store = Arc::new(MemoryStatsStore::new());
        let app = router_with_store(
            store.clone(),
            TrackingConfig {
                channels: true,
                sessions: false,
            },
        );

        let response = app
            .oneshot(post_json("/click", r#"{"button_id":"cta","type":"tablet"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(store.click_log().is_empty());
        assert!(store.stats_in_range(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn click_requires_button_id() {
        let app = router(TrackingConfig::default());

        let response = app.oneshot(post_json("/click", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["detail"], "button_id is required");
    }

    #[tokio::test]
    async fn click_message_names_the_channel() {
        let app = router(TrackingConfig {
            channels: true,
            sessions: false,
        });

        let response = app
            .clone()
            .oneshot(post_json("/click", r#"{"button_id":"cta","type":"web"}"#))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["message"], "Web click counted");

        let response = app
            .oneshot(post_json("/click", r#"{"button_id":"cta","type":"mobile"}"#))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["message"], "Mobile click counted");
    }

    #[tokio::test]
    async fn track_time_unknown_session_is_404() {
        let app = router(TrackingConfig {
            channels: false,
            sessions: true,
        });

        let response = app
            .oneshot(post_json("/track-time", r#"{"session_id":"missing"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["detail"], "Session not found");
    }

    #[tokio::test]
    async fn session_open_close_reports_duration() {
        let app = router(TrackingConfig {
            channels: false,
            sessions: true,
        });

        let response = app
            .clone()
            .oneshot(post_json("/pageview", "{}"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(post_json(
                "/track-time",
                &format!(r#"{{"session_id":"{}"}}"#, session_id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Exit recorded");
        assert_eq!(body["session_id"], session_id.as_str());
        assert!(body["duration"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn stats_aggregates_recorded_activity() {
        let app = router(TrackingConfig::default());

        for _ in 0..2 {
            app.clone()
                .oneshot(post_json("/pageview", "{}"))
                .await
                .unwrap();
        }
        app.clone()
            .oneshot(post_json("/click", r#"{"button_id":"cta"}"#))
            .await
            .unwrap();

        let response = app.oneshot(get_req("/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let stats = body["stats"].as_array().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0]["date"], today());
        assert_eq!(stats[0]["page_views"], 2);
        assert_eq!(stats[0]["clicks"], 1);
        assert_eq!(stats[0]["average_duration"], 0);
        // Channel counters were never touched and stay absent
        assert!(stats[0].get("web_views").is_none());
    }

    #[tokio::test]
    async fn stats_rejects_invalid_type() {
        let app = router(TrackingConfig::default());

        let response = app.oneshot(get_req("/stats?type=tablet")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_rejects_half_open_range() {
        let app = router(TrackingConfig::default());

        let response = app
            .oneshot(get_req("/stats?start_date=2026-01-01"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn download_requires_both_bounds() {
        let app = router(TrackingConfig::default());

        let response = app
            .oneshot(get_req("/download?start_date=2026-01-01"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["detail"], "start_date and end_date are required");
    }

    #[tokio::test]
    async fn download_streams_csv_attachment() {
        let app = router(TrackingConfig::default());

        app.clone()
            .oneshot(post_json("/pageview", "{}"))
            .await
            .unwrap();

        let response = app
            .oneshot(get_req(
                "/download?start_date=2020-01-01&end_date=2030-12-31",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"stats_data_2020-01-01_to_2030-12-31.csv\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Date,Page Views,Clicks,Average Duration (s)"));
        assert!(text.contains(&today()));
    }

    #[tokio::test]
    async fn channel_download_carries_bom_and_split_columns() {
        let app = router(TrackingConfig {
            channels: true,
            sessions: false,
        });

        app.clone()
            .oneshot(post_json("/pageview", r#"{"type":"web"}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(get_req(
                "/download?start_date=2020-01-01&end_date=2030-12-31",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));

        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Web Page Views,Mobile Page Views,Web Clicks,Mobile Clicks"));
    }
}
