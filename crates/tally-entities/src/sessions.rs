//! `SeaORM` Entity for the sessions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::UtcDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// UUID assigned at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: String,
    pub channel: Option<String>,
    pub entry_time: UtcDateTime,
    /// Set once the visit ends; open sessions are excluded from averages
    pub exit_time: Option<UtcDateTime>,
    /// Fractional seconds between entry and exit
    pub duration_seconds: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
