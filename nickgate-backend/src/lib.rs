pub mod bot;
pub mod config;
mod error;
pub mod gate;
pub mod helpers;
mod routes;
pub mod session;
mod validation;

pub use validation::PlayerName;

use crate::bot::GroupBot;
use crate::gate::ConnectionGate;
use crate::session::SessionTracker;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use nickgate_db::{Database, RemarkCache};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

pub struct AppState {
    pub db: Database,
    pub cache: Arc<RemarkCache>,
    pub gate: ConnectionGate,
    pub bot: Option<Arc<dyn GroupBot>>,
    pub api_key: String,
}

impl AppState {
    /// Wire the cache and gate around one database handle.
    pub fn new(
        db: Database,
        bot: Option<Arc<dyn GroupBot>>,
        api_key: String,
        notify_cooldown_ms: i64,
    ) -> Self {
        let cache = Arc::new(RemarkCache::new(db.clone()));
        let gate = ConnectionGate::new(cache.clone(), SessionTracker::new(notify_cooldown_ms));
        Self {
            db,
            cache,
            gate,
            bot,
            api_key,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for /prelogin
    pub prelogin_per_sec: u64,
    /// Burst size for /prelogin (login waves after a server restart)
    pub prelogin_burst: u32,
    /// Requests per second for general endpoints
    pub general_per_sec: u64,
    /// Burst size for general endpoints
    pub general_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            prelogin_per_sec: 10,
            prelogin_burst: 50,
            general_per_sec: 10,
            general_burst: 20,
        }
    }
}

/// Create the application router with the given state and configuration
pub fn create_app(
    state: AppState,
    request_body_limit: usize,
    request_timeout: Duration,
    rate_limit: RateLimitConfig,
) -> Router {
    let state = Arc::new(state);

    // Prelogin sees bursts when a restarted game server lets everyone back in
    let prelogin_governor = GovernorConfigBuilder::default()
        .per_second(rate_limit.prelogin_per_sec)
        .burst_size(rate_limit.prelogin_burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .unwrap();

    // General rate limit for the remark endpoints
    let general_governor = GovernorConfigBuilder::default()
        .per_second(rate_limit.general_per_sec)
        .burst_size(rate_limit.general_burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .unwrap();

    let prelogin_routes = Router::new()
        .route("/prelogin", post(routes::prelogin))
        .layer(GovernorLayer::new(prelogin_governor));

    let general_routes = Router::new()
        .route(
            "/remark/{account_id}",
            get(routes::get_remark).put(routes::set_remark),
        )
        .route("/remarks", get(routes::query_by_prefix))
        .route("/group-message", post(routes::group_message))
        .layer(GovernorLayer::new(general_governor));

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(prelogin_routes)
        .merge(general_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(RequestBodyLimitLayer::new(request_body_limit))
        .with_state(state)
}
