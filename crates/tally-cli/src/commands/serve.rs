use clap::Args;
use std::sync::Arc;
use tally_analytics::handler::{configure_routes, AppState, TrackingApiDoc};
use tally_analytics::{PgStatsStore, TrackingConfig, TrackingService};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:3004", env = "TALLY_ADDRESS")]
    pub address: String,

    /// Database connection URL
    #[arg(long, env = "TALLY_DATABASE_URL")]
    pub database_url: String,

    /// Split view and click counters by web/mobile channel
    #[arg(long, env = "TALLY_CHANNELS")]
    pub channels: bool,

    /// Disable per-visit session tracking
    #[arg(long, env = "TALLY_NO_SESSIONS")]
    pub no_sessions: bool,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        debug!("Initializing database connection...");
        // An unreachable store at startup is fatal; exit instead of
        // serving degraded traffic
        let db = tally_database::establish_connection(&self.database_url).await?;

        let config = TrackingConfig {
            channels: self.channels,
            sessions: !self.no_sessions,
        };

        let store = Arc::new(PgStatsStore::new(db.clone()));
        let tracking = Arc::new(TrackingService::new(store, config));
        let state = Arc::new(AppState { tracking, config });

        let app = configure_routes()
            .with_state(state)
            .merge(
                SwaggerUi::new("/swagger-ui")
                    .url("/api-docs/openapi.json", TrackingApiDoc::openapi()),
            )
            .layer(CorsLayer::permissive());

        let listener = TcpListener::bind(&self.address).await?;
        info!("Tally server listening on {}", self.address);
        info!(
            channels = config.channels,
            sessions = config.sessions,
            "Tracking configuration"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Close the pool once the server stops accepting requests
        match Arc::try_unwrap(db) {
            Ok(db) => {
                if let Err(e) = db.close().await {
                    warn!("Error closing database connection: {}", e);
                } else {
                    debug!("Database connection closed");
                }
            }
            Err(_) => debug!("Database still has other references, skipping close"),
        }

        info!("Tally server exited");
        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c signal");
    info!("Received Ctrl+C, initiating graceful shutdown...");
}
