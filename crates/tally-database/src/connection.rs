//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tally_core::{ServiceError, ServiceResult};
use tally_migrations::{Migrator, MigratorTrait};

pub type DbConnection = DatabaseConnection;

// Every request issues at most two short statements, so a modest pool
// is enough for a single collector node.
const MAX_CONNECTIONS: u32 = 20;
const MIN_CONNECTIONS: u32 = 2;

pub async fn establish_connection(database_url: &str) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(MAX_CONNECTIONS)
        .min_connections(MIN_CONNECTIONS)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    // Run migrations before serving any traffic
    Migrator::up(&db, None)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Ok(Arc::new(db))
}
