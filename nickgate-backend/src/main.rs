use nickgate_backend::{AppState, RateLimitConfig, create_app};
use nickgate_db::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = tracing::Level::DEBUG;
    #[cfg(not(debug_assertions))]
    let log_level = tracing::Level::INFO;

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting nickgate backend server...");

    // Load configuration from environment variables or use defaults
    let config = nickgate_backend::config::Config::from_env();
    tracing::info!(
        "Configuration: port={}, db_path={}, body_limit={}KB, timeout={}s, notify_cooldown={}ms",
        config.port,
        config.database_path,
        config.request_body_limit / 1024,
        config.request_timeout.as_secs(),
        config.notify_cooldown_ms
    );
    tracing::info!(
        "Rate limits: prelogin={}/sec (burst {}), general={}/sec (burst {})",
        config.rate_limit_prelogin_per_sec,
        config.rate_limit_prelogin_burst,
        config.rate_limit_general_per_sec,
        config.rate_limit_general_burst
    );

    let db = Database::open(&config.database_path).await.unwrap();

    // The group-bot client is deployed separately; until one registers,
    // prelogin checks degrade to allow-all.
    tracing::warn!("group bot not configured, nickname checks will be skipped");
    let state = AppState::new(
        db,
        None,
        config.api_key.unwrap(),
        config.notify_cooldown_ms,
    );

    let rate_limit = RateLimitConfig {
        prelogin_per_sec: config.rate_limit_prelogin_per_sec,
        prelogin_burst: config.rate_limit_prelogin_burst,
        general_per_sec: config.rate_limit_general_per_sec,
        general_burst: config.rate_limit_general_burst,
    };
    let app = create_app(
        state,
        config.request_body_limit,
        config.request_timeout,
        rate_limit,
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    tracing::info!("Server listening on {}", addr);

    if let Err(e) =
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
    {
        tracing::error!("Axum server error: {}", e);
    }
}
