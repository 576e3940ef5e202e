//! HTTP surface
//!
//! | Method | Path             | Handler                       |
//! |--------|------------------|-------------------------------|
//! | GET    | `/health`        | [`handlers::health`]          |
//! | POST   | `/api/users`     | [`handlers::insert_users`]    |
//! | GET    | `/api/leadboard` | [`handlers::fetch_leaderboard`] |
//! | GET    | `/api/username`  | [`handlers::search_user`]     |
//! | POST   | `/api/simulate`  | [`handlers::simulate`]        |

pub mod cors;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::db::DurableStore;
use crate::deadline::RequestTimeouts;
use crate::pipeline::UpdateQueue;
use crate::ranking::{PrefixIndex, RankedStore};
use crate::services::bootstrap::DEFAULT_PAGE_SIZE;
use crate::services::simulator::DEFAULT_SIMULATION_UPDATES;
use crate::services::{BootstrapLoader, LoadSimulator, RankQueryService, SearchService};
use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;

/// Knobs the handlers need beyond the services themselves
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
    pub bootstrap_page_size: usize,
    pub simulation_updates: usize,
    pub timeouts: RequestTimeouts,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bootstrap_page_size: DEFAULT_PAGE_SIZE,
            simulation_updates: DEFAULT_SIMULATION_UPDATES,
            timeouts: RequestTimeouts::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub(crate) bootstrap: Arc<BootstrapLoader>,
    pub(crate) rank_query: Arc<RankQueryService>,
    pub(crate) search: Arc<SearchService>,
    pub(crate) simulator: Arc<LoadSimulator>,
    pub(crate) timeouts: RequestTimeouts,
    pub(crate) simulation_updates: usize,
}

impl AppState {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        ranked: Arc<dyn RankedStore>,
        prefixes: Arc<PrefixIndex>,
        queue: UpdateQueue,
        settings: ApiSettings,
    ) -> Self {
        Self {
            bootstrap: Arc::new(BootstrapLoader::new(
                durable,
                Arc::clone(&ranked),
                Arc::clone(&prefixes),
                settings.bootstrap_page_size,
            )),
            rank_query: Arc::new(RankQueryService::new(Arc::clone(&ranked))),
            search: Arc::new(SearchService::new(prefixes, Arc::clone(&ranked))),
            simulator: Arc::new(LoadSimulator::new(ranked, queue)),
            timeouts: settings.timeouts,
            simulation_updates: settings.simulation_updates,
        }
    }
}

/// Build the application router with CORS locked to `frontend_url`
pub fn router(state: AppState, frontend_url: &str) -> Result<Router, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .route("/api/users", post(handlers::insert_users))
        .route("/api/leadboard", get(handlers::fetch_leaderboard))
        .route("/api/username", get(handlers::search_user))
        .route("/api/simulate", post(handlers::simulate))
        .with_state(state)
        .layer(middleware::from_fn_with_state(origin, cors::allow_frontend)))
}
