use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tally_core::DateKey;
use tally_entities::daily_stats;

use crate::channel::Channel;
use crate::store::{CounterField, StatsStore};
use crate::traits::Tracking;
use crate::types::responses::DailyStatRow;
use crate::types::{PageViewOutcome, TrackingConfig, TrackingError};

pub struct TrackingService {
    store: Arc<dyn StatsStore>,
    config: TrackingConfig,
}

impl TrackingService {
    pub fn new(store: Arc<dyn StatsStore>, config: TrackingConfig) -> Self {
        TrackingService { store, config }
    }

    fn view_field(&self, channel: Option<Channel>) -> Result<CounterField, TrackingError> {
        if !self.config.channels {
            return Ok(CounterField::PageViews);
        }
        channel
            .map(|c| c.view_field())
            .ok_or_else(|| TrackingError::Validation("Channel type is required".to_string()))
    }

    fn click_field(&self, channel: Option<Channel>) -> Result<CounterField, TrackingError> {
        if !self.config.channels {
            return Ok(CounterField::Clicks);
        }
        channel
            .map(|c| c.click_field())
            .ok_or_else(|| TrackingError::Validation("Channel type is required".to_string()))
    }

    async fn average_duration(
        &self,
        date: &str,
        channel: Option<Channel>,
    ) -> Result<i64, TrackingError> {
        let durations = self.store.closed_durations(date, channel).await?;
        Ok(round_average(&durations))
    }
}

/// Average rounded to whole seconds, `0` when no closed sessions exist.
/// Individual durations stay fractional; only the average is rounded.
fn round_average(durations: &[f64]) -> i64 {
    if durations.is_empty() {
        return 0;
    }
    (durations.iter().sum::<f64>() / durations.len() as f64).round() as i64
}

fn stat_row(row: daily_stats::Model, average_duration: i64) -> DailyStatRow {
    DailyStatRow {
        date: row.date,
        page_views: row.page_views,
        clicks: row.clicks,
        web_views: row.web_views,
        mobile_views: row.mobile_views,
        web_clicks: row.web_clicks,
        mobile_clicks: row.mobile_clicks,
        average_duration,
    }
}

#[async_trait]
impl Tracking for TrackingService {
    async fn record_page_view(
        &self,
        channel: Option<Channel>,
    ) -> Result<PageViewOutcome, TrackingError> {
        let now = Utc::now();
        let date = DateKey::from_datetime(now);
        let field = self.view_field(channel)?;

        self.store.increment_counter(&date, field, 1).await?;

        let mut outcome = PageViewOutcome {
            date: date.clone(),
            session_id: None,
            average_duration: None,
        };

        if self.config.sessions {
            let session_id = self.store.open_session(&date, now, channel).await?;
            outcome.session_id = Some(session_id);
            outcome.average_duration = Some(self.average_duration(date.as_str(), None).await?);
        }

        Ok(outcome)
    }

    async fn record_click(
        &self,
        button_id: &str,
        channel: Option<Channel>,
    ) -> Result<DateKey, TrackingError> {
        let now = Utc::now();
        let date = DateKey::from_datetime(now);
        let field = self.click_field(channel)?;

        self.store.increment_counter(&date, field, 1).await?;
        self.store
            .insert_click(&date, button_id, channel, now)
            .await?;

        Ok(date)
    }

    async fn close_session(&self, session_id: &str) -> Result<f64, TrackingError> {
        self.store.close_session(session_id, Utc::now()).await
    }

    async fn get_stats(
        &self,
        range: Option<(DateKey, DateKey)>,
        channel: Option<Channel>,
    ) -> Result<Vec<DailyStatRow>, TrackingError> {
        let rows = self
            .store
            .stats_in_range(range.as_ref().map(|(s, e)| (s, e)))
            .await?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in rows {
            let average = self.average_duration(&row.date, channel).await?;
            stats.push(stat_row(row, average));
        }

        Ok(stats)
    }
}
