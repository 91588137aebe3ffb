use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, Statement,
};
use std::sync::Arc;
use tally_core::{DateKey, UtcDateTime};
use tally_entities::{clicks, daily_stats, sessions};
use uuid::Uuid;

use crate::channel::Channel;
use crate::types::TrackingError;

/// Closed set of counter columns on `daily_stats`
///
/// Keeping this an enum (rather than accepting a column name) is what
/// makes the interpolated upsert SQL injection-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    PageViews,
    Clicks,
    WebViews,
    MobileViews,
    WebClicks,
    MobileClicks,
}

impl CounterField {
    pub fn column_name(&self) -> &'static str {
        match self {
            CounterField::PageViews => "page_views",
            CounterField::Clicks => "clicks",
            CounterField::WebViews => "web_views",
            CounterField::MobileViews => "mobile_views",
            CounterField::WebClicks => "web_clicks",
            CounterField::MobileClicks => "mobile_clicks",
        }
    }
}

/// Persistence seam for counters, the click log, and sessions
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Atomically add `amount` to a counter, creating the date row if absent
    async fn increment_counter(
        &self,
        date: &DateKey,
        field: CounterField,
        amount: i64,
    ) -> Result<(), TrackingError>;

    /// Append one row to the click log
    async fn insert_click(
        &self,
        date: &DateKey,
        button_id: &str,
        channel: Option<Channel>,
        created_at: UtcDateTime,
    ) -> Result<(), TrackingError>;

    /// Insert an open session and return its generated id
    async fn open_session(
        &self,
        date: &DateKey,
        entry_time: UtcDateTime,
        channel: Option<Channel>,
    ) -> Result<String, TrackingError>;

    /// Close a session, storing exit time and duration; returns the duration
    /// in fractional seconds. Closing an already-closed session overwrites
    /// its exit data.
    async fn close_session(
        &self,
        session_id: &str,
        exit_time: UtcDateTime,
    ) -> Result<f64, TrackingError>;

    /// Fetch stat rows, inclusive of both range ends, sorted by date ascending
    async fn stats_in_range(
        &self,
        range: Option<(&DateKey, &DateKey)>,
    ) -> Result<Vec<daily_stats::Model>, TrackingError>;

    /// Durations of closed sessions for one date, optionally one channel
    async fn closed_durations(
        &self,
        date: &str,
        channel: Option<Channel>,
    ) -> Result<Vec<f64>, TrackingError>;
}

/// Postgres-backed store
pub struct PgStatsStore {
    db: Arc<DatabaseConnection>,
}

impl PgStatsStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        PgStatsStore { db }
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn increment_counter(
        &self,
        date: &DateKey,
        field: CounterField,
        amount: i64,
    ) -> Result<(), TrackingError> {
        // Column name comes from the closed CounterField enum; the values
        // are bound parameters.
        let column = field.column_name();
        let sql = format!(
            "INSERT INTO daily_stats (date, {column}) VALUES ($1, $2) \
             ON CONFLICT (date) DO UPDATE \
             SET {column} = COALESCE(daily_stats.{column}, 0) + EXCLUDED.{column}"
        );

        self.db
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                sql,
                [date.as_str().into(), amount.into()],
            ))
            .await?;

        Ok(())
    }

    async fn insert_click(
        &self,
        date: &DateKey,
        button_id: &str,
        channel: Option<Channel>,
        created_at: UtcDateTime,
    ) -> Result<(), TrackingError> {
        let click = clicks::ActiveModel {
            date: Set(date.as_str().to_string()),
            button_id: Set(button_id.to_string()),
            channel: Set(channel.map(|c| c.as_str().to_string())),
            created_at: Set(created_at),
            ..Default::default()
        };

        click.insert(&*self.db).await?;
        Ok(())
    }

    async fn open_session(
        &self,
        date: &DateKey,
        entry_time: UtcDateTime,
        channel: Option<Channel>,
    ) -> Result<String, TrackingError> {
        let id = Uuid::new_v4().to_string();

        let session = sessions::ActiveModel {
            id: Set(id.clone()),
            date: Set(date.as_str().to_string()),
            channel: Set(channel.map(|c| c.as_str().to_string())),
            entry_time: Set(entry_time),
            exit_time: Set(None),
            duration_seconds: Set(None),
        };

        session.insert(&*self.db).await?;
        Ok(id)
    }

    async fn close_session(
        &self,
        session_id: &str,
        exit_time: UtcDateTime,
    ) -> Result<f64, TrackingError> {
        let session = sessions::Entity::find_by_id(session_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| TrackingError::SessionNotFound(session_id.to_string()))?;

        let duration = (exit_time - session.entry_time).num_milliseconds() as f64 / 1000.0;

        let mut active: sessions::ActiveModel = session.into();
        active.exit_time = Set(Some(exit_time));
        active.duration_seconds = Set(Some(duration));
        active.update(&*self.db).await?;

        Ok(duration)
    }

    async fn stats_in_range(
        &self,
        range: Option<(&DateKey, &DateKey)>,
    ) -> Result<Vec<daily_stats::Model>, TrackingError> {
        let mut query = daily_stats::Entity::find();

        if let Some((start, end)) = range {
            query = query.filter(daily_stats::Column::Date.between(start.as_str(), end.as_str()));
        }

        let rows = query
            .order_by_asc(daily_stats::Column::Date)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    async fn closed_durations(
        &self,
        date: &str,
        channel: Option<Channel>,
    ) -> Result<Vec<f64>, TrackingError> {
        let mut query = sessions::Entity::find()
            .filter(sessions::Column::Date.eq(date))
            .filter(sessions::Column::DurationSeconds.is_not_null());

        if let Some(channel) = channel {
            query = query.filter(sessions::Column::Channel.eq(channel.as_str()));
        }

        let durations = query
            .all(&*self.db)
            .await?
            .into_iter()
            .filter_map(|s| s.duration_seconds)
            .collect();

        Ok(durations)
    }
}
