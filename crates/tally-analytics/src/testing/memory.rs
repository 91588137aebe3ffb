//! In-memory `StatsStore` used by unit tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tally_core::{DateKey, UtcDateTime};
use tally_entities::{clicks, daily_stats, sessions};
use uuid::Uuid;

use crate::channel::Channel;
use crate::store::{CounterField, StatsStore};
use crate::types::TrackingError;

#[derive(Default)]
struct Inner {
    stats: BTreeMap<String, daily_stats::Model>,
    clicks: Vec<clicks::Model>,
    sessions: HashMap<String, sessions::Model>,
}

#[derive(Default)]
pub struct MemoryStatsStore {
    inner: Mutex<Inner>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click_log(&self) -> Vec<clicks::Model> {
        self.inner.lock().unwrap().clicks.clone()
    }

    pub fn session(&self, id: &str) -> Option<sessions::Model> {
        self.inner.lock().unwrap().sessions.get(id).cloned()
    }

    /// Insert an already-closed session with a fixed duration
    pub fn seed_closed_session(&self, date: &DateKey, channel: Option<Channel>, duration: f64) {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        self.inner.lock().unwrap().sessions.insert(
            id.clone(),
            sessions::Model {
                id,
                date: date.as_str().to_string(),
                channel: channel.map(|c| c.as_str().to_string()),
                entry_time: now,
                exit_time: Some(now),
                duration_seconds: Some(duration),
            },
        );
    }
}

fn empty_row(date: &str) -> daily_stats::Model {
    daily_stats::Model {
        date: date.to_string(),
        page_views: None,
        clicks: None,
        web_views: None,
        mobile_views: None,
        web_clicks: None,
        mobile_clicks: None,
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn increment_counter(
        &self,
        date: &DateKey,
        field: CounterField,
        amount: i64,
    ) -> Result<(), TrackingError> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner
            .stats
            .entry(date.as_str().to_string())
            .or_insert_with(|| empty_row(date.as_str()));

        let slot = match field {
            CounterField::PageViews => &mut row.page_views,
            CounterField::Clicks => &mut row.clicks,
            CounterField::WebViews => &mut row.web_views,
            CounterField::MobileViews => &mut row.mobile_views,
            CounterField::WebClicks => &mut row.web_clicks,
            CounterField::MobileClicks => &mut row.mobile_clicks,
        };
        *slot = Some(slot.unwrap_or(0) + amount);

        Ok(())
    }

    async fn insert_click(
        &self,
        date: &DateKey,
        button_id: &str,
        channel: Option<Channel>,
        created_at: UtcDateTime,
    ) -> Result<(), TrackingError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.clicks.len() as i64 + 1;
        inner.clicks.push(clicks::Model {
            id,
            date: date.as_str().to_string(),
            button_id: button_id.to_string(),
            channel: channel.map(|c| c.as_str().to_string()),
            created_at,
        });
        Ok(())
    }

    async fn open_session(
        &self,
        date: &DateKey,
        entry_time: UtcDateTime,
        channel: Option<Channel>,
    ) -> Result<String, TrackingError> {
        let id = Uuid::new_v4().to_string();
        self.inner.lock().unwrap().sessions.insert(
            id.clone(),
            sessions::Model {
                id: id.clone(),
                date: date.as_str().to_string(),
                channel: channel.map(|c| c.as_str().to_string()),
                entry_time,
                exit_time: None,
                duration_seconds: None,
            },
        );
        Ok(id)
    }

    async fn close_session(
        &self,
        session_id: &str,
        exit_time: UtcDateTime,
    ) -> Result<f64, TrackingError> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| TrackingError::SessionNotFound(session_id.to_string()))?;

        let duration = (exit_time - session.entry_time).num_milliseconds() as f64 / 1000.0;
        session.exit_time = Some(exit_time);
        session.duration_seconds = Some(duration);

        Ok(duration)
    }

    async fn stats_in_range(
        &self,
        range: Option<(&DateKey, &DateKey)>,
    ) -> Result<Vec<daily_stats::Model>, TrackingError> {
        let inner = self.inner.lock().unwrap();
        let rows = inner
            .stats
            .values()
            .filter(|row| match range {
                Some((start, end)) => {
                    row.date.as_str() >= start.as_str() && row.date.as_str() <= end.as_str()
                }
                None => true,
            })
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn closed_durations(
        &self,
        date: &str,
        channel: Option<Channel>,
    ) -> Result<Vec<f64>, TrackingError> {
        let inner = self.inner.lock().unwrap();
        let durations = inner
            .sessions
            .values()
            .filter(|s| s.date == date)
            .filter(|s| match channel {
                Some(channel) => s.channel.as_deref() == Some(channel.as_str()),
                None => true,
            })
            .filter_map(|s| s.duration_seconds)
            .collect();
        Ok(durations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn double_close_overwrites_exit_data() {
        let store = MemoryStatsStore::new();
        let date: DateKey = "2026-06-01".parse().unwrap();
        let entry = Utc::now();

        let id = store.open_session(&date, entry, None).await.unwrap();

        let first = store
            .close_session(&id, entry + Duration::seconds(10))
            .await
            .unwrap();
        let second = store
            .close_session(&id, entry + Duration::seconds(25))
            .await
            .unwrap();

        assert_eq!(first, 10.0);
        assert_eq!(second, 25.0);
        assert_eq!(store.session(&id).unwrap().duration_seconds, Some(25.0));
    }
}
