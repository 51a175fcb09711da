use std::env::var;
use std::time::Duration;

use crate::session::DEFAULT_NOTIFY_COOLDOWN_MS;
use dotenvy::dotenv;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Request body size limit in bytes
    /// Env: REQUEST_BODY_LIMIT (default: 65536 = 64KB, payloads are tiny)
    pub request_body_limit: usize,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,

    /// Server port
    /// Env: PORT (default: 3000)
    pub port: u16,

    /// Database file path
    /// Env: DATABASE_PATH (default: "nickgate.db")
    pub database_path: String,

    /// Shared API key the game-server plugin authenticates with
    /// Env: API_KEY (required at runtime, panics if missing)
    pub api_key: Option<String>,

    /// Pause between repeated "fix your nickname" notices per session
    /// Env: NOTIFY_COOLDOWN_MS (default: 120000 = 2 minutes)
    pub notify_cooldown_ms: i64,

    /// Rate limit for /prelogin (requests per second)
    /// Env: RATE_LIMIT_PRELOGIN_PER_SEC (default: 10)
    /// Login bursts happen after a server restart, hence the burst headroom
    pub rate_limit_prelogin_per_sec: u64,

    /// Burst size for /prelogin
    /// Env: RATE_LIMIT_PRELOGIN_BURST (default: 50)
    pub rate_limit_prelogin_burst: u32,

    /// Rate limit for general endpoints (requests per second)
    /// Env: RATE_LIMIT_GENERAL_PER_SEC (default: 10)
    pub rate_limit_general_per_sec: u64,

    /// Burst size for general endpoints
    /// Env: RATE_LIMIT_GENERAL_BURST (default: 20)
    pub rate_limit_general_burst: u32,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for debugging mostly
        Self {
            request_body_limit: env_or_default("REQUEST_BODY_LIMIT", 64 * 1024),
            request_timeout: Duration::from_secs(env_or_default("REQUEST_TIMEOUT_SECS", 30)),
            port: env_or_default("PORT", 3000),
            database_path: env_or_default_string("DATABASE_PATH", "nickgate.db"),
            api_key: var("API_KEY")
                .expect("API_KEY environment variable is required")
                .into(),
            notify_cooldown_ms: env_or_default("NOTIFY_COOLDOWN_MS", DEFAULT_NOTIFY_COOLDOWN_MS),
            rate_limit_prelogin_per_sec: env_or_default("RATE_LIMIT_PRELOGIN_PER_SEC", 10),
            rate_limit_prelogin_burst: env_or_default("RATE_LIMIT_PRELOGIN_BURST", 50),
            rate_limit_general_per_sec: env_or_default("RATE_LIMIT_GENERAL_PER_SEC", 10),
            rate_limit_general_burst: env_or_default("RATE_LIMIT_GENERAL_BURST", 20),
        }
    }

    /// Create configuration with all default values
    pub fn default() -> Self {
        Self {
            request_body_limit: 64 * 1024,
            request_timeout: Duration::from_secs(30),
            port: 3000,
            database_path: "nickgate.db".to_string(),
            api_key: None,
            notify_cooldown_ms: DEFAULT_NOTIFY_COOLDOWN_MS,
            rate_limit_prelogin_per_sec: 10,
            rate_limit_prelogin_burst: 50,
            rate_limit_general_per_sec: 10,
            rate_limit_general_burst: 20,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Parse environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.request_body_limit, 64 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, "nickgate.db");
        assert_eq!(config.notify_cooldown_ms, 120_000);
        assert_eq!(config.rate_limit_prelogin_per_sec, 10);
        assert_eq!(config.rate_limit_prelogin_burst, 50);
        assert_eq!(config.rate_limit_general_per_sec, 10);
        assert_eq!(config.rate_limit_general_burst, 20);
    }
}
