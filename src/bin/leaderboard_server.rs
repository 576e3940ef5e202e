//! Leaderboard HTTP server
//!
//! Usage:
//!   cargo run --release --bin leaderboard_server
//!
//! Environment variables (see `AppConfig::from_env`):
//!   DATABASE_URL     - durable store, e.g. sqlite://data/leaderboard.db
//!   RANKED_STORE_URL - ranked store, memory://
//!   FRONTEND_URL     - allowed CORS origin
//!   PORT             - listen port (default: 8080)
//!
//! The ranked store starts empty. POST /api/users loads it from the
//! durable store.

use dotenv::dotenv;
use leaderboard::api::{self, AppState};
use leaderboard::config::{AppConfig, RankedStoreKind};
use leaderboard::db::{DurableStore, SqliteDurableStore};
use leaderboard::pipeline::{UpdatePipeline, UpdateQueue};
use leaderboard::ranking::{InMemoryRankedStore, PrefixIndex, RankedStore};
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 Leaderboard server starting");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("   ├─ Database: {}", config.database_url);
    info!("   ├─ Ranked store: {:?}", config.ranked_store);
    info!("   ├─ Frontend origin: {}", config.frontend_url);
    info!("   └─ Port: {}", config.port);

    let durable = Arc::new(SqliteDurableStore::open(&config.database_url)?);
    durable.ping().await?;
    info!("✅ Durable store ready");

    let ranked: Arc<dyn RankedStore> = match config.ranked_store {
        RankedStoreKind::InMemory => Arc::new(InMemoryRankedStore::new()),
    };
    info!("📊 Backend: {}", ranked.backend_type());
    let prefixes = Arc::new(PrefixIndex::new());

    let (queue, receiver) = UpdateQueue::bounded(config.pipeline.queue_capacity);
    let pipeline = UpdatePipeline::start(receiver, durable.clone(), &config.pipeline);

    let state = AppState::new(durable, ranked, prefixes, queue, config.api_settings());
    let app = api::router(state, &config.frontend_url)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("🌐 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Workers drain what is still queued and do a final flush
    let stats = pipeline.shutdown().await;
    if stats.dropped > 0 {
        error!("❌ {} rating updates never reached the durable store", stats.dropped);
    }

    info!("👋 Leaderboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("🛑 Shutdown signal received"),
        Err(e) => error!("❌ Failed to listen for shutdown signal: {}", e),
    }
}
