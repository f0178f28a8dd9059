//! Server settings read from the environment.

use std::path::PathBuf;

use safety_map_database::paths;

/// Reports per live-feed update when the client does not ask for a limit.
pub const DEFAULT_LIVE_FEED_LIMIT: u32 = 10;

/// Largest live-feed limit a client may request.
pub const MAX_LIVE_FEED_LIMIT: u32 = 500;

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default `8080`).
    pub port: u16,
    /// Report database file (`SAFETY_MAP_DB_PATH`, default
    /// `data/safety_map.db`).
    pub db_path: PathBuf,
    /// Default live-feed limit (`LIVE_FEED_LIMIT`).
    pub live_feed_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            db_path: paths::default_db_path(),
            live_feed_limit: DEFAULT_LIVE_FEED_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Missing or unparseable values fall
    /// back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let live_feed_limit = lookup("LIVE_FEED_LIMIT")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
            .map_or(defaults.live_feed_limit, |n| n.min(MAX_LIVE_FEED_LIMIT));

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            db_path: lookup("SAFETY_MAP_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            live_feed_limit,
        }
    }

    /// Clamps a client-requested live-feed limit.
    #[must_use]
    pub fn live_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.live_feed_limit)
            .clamp(1, MAX_LIVE_FEED_LIMIT)
    }
}
