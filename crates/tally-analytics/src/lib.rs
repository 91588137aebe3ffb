pub mod channel;
pub mod export;
pub mod handler;
pub mod store;
pub mod tracking;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod testing;

// Re-export main types and services
pub use channel::Channel;
pub use store::{CounterField, PgStatsStore, StatsStore};
pub use tracking::TrackingService;
pub use traits::Tracking;
pub use types::*;
