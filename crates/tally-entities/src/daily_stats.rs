//! `SeaORM` Entity for the daily_stats table
//!
//! One row per calendar date. Counter columns stay NULL until the first
//! increment for that date touches them, mirroring lazy upsert creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_stats")]
pub struct Model {
    /// Calendar-date key, `YYYY-MM-DD`
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: String,

    // Unsplit counters
    pub page_views: Option<i64>,
    pub clicks: Option<i64>,

    // Channel-split counters
    pub web_views: Option<i64>,
    pub mobile_views: Option<i64>,
    pub web_clicks: Option<i64>,
    pub mobile_clicks: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
