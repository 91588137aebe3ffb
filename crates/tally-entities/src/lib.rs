//! `SeaORM` entities for the Tally collector schema

pub mod clicks;
pub mod daily_stats;
pub mod sessions;
