//! Configuration Module
//!
//! Handles loading and managing relay configuration from environment variables.

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::cache::CacheConfig;
use crate::fetch::DEFAULT_MAX_RETRIES;

/// Upstream catalog queried when `TEMPLATE_API_BASE` is unset
const DEFAULT_API_BASE: &str = "https://api.n8n.io";

/// Relay configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream template catalog
    pub api_base: Url,
    /// Attempts allowed per upstream fetch
    pub max_retries: u32,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Cache sizing and per-tier TTLs
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Values that fail to parse fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `TEMPLATE_API_BASE` - Upstream catalog base URL (default: https://api.n8n.io)
    /// - `FETCH_MAX_RETRIES` - Attempts per upstream fetch (default: 3)
    /// - `CLEANUP_INTERVAL_SECS` - Expiry sweep frequency in seconds (default: 60)
    /// - `CACHE_MAX_SIZE` - Entry budget across all cache tiers (default: 1000)
    /// - `CACHE_SEARCH_TTL` - Search tier TTL in seconds (default: 900)
    /// - `CACHE_TEMPLATE_TTL` - Template tier TTL in seconds (default: 3600)
    /// - `CACHE_CATEGORIES_TTL` - Categories tier TTL in seconds (default: 86400)
    pub fn from_env() -> Self {
        let cache_defaults = CacheConfig::default();

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base: env::var("TEMPLATE_API_BASE")
                .ok()
                .and_then(|v| parse_base_url(&v))
                .unwrap_or_else(default_api_base),
            max_retries: env::var("FETCH_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
            cleanup_interval: env::var("CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            cache: CacheConfig {
                max_size: env::var("CACHE_MAX_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(cache_defaults.max_size),
                search_ttl: ttl_from_env("CACHE_SEARCH_TTL", cache_defaults.search_ttl),
                template_ttl: ttl_from_env("CACHE_TEMPLATE_TTL", cache_defaults.template_ttl),
                categories_ttl: ttl_from_env("CACHE_CATEGORIES_TTL", cache_defaults.categories_ttl),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            api_base: default_api_base(),
            max_retries: DEFAULT_MAX_RETRIES,
            cleanup_interval: 60,
            cache: CacheConfig::default(),
        }
    }
}

fn default_api_base() -> Url {
    Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url")
}

/// Parses an operator-supplied base URL, accepting only http(s).
fn parse_base_url(value: &str) -> Option<Url> {
    Url::parse(value)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn ttl_from_env(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
