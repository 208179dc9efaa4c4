//! Runtime configuration for vinyl_scout
//!
//! Every component takes its credentials, paths and endpoints from this
//! struct instead of module globals, so tests can point the clients at
//! mock servers and temporary files.

use std::path::PathBuf;
use std::time::Duration;

/// Discogs API root
pub const DISCOGS_API_URL: &str = "https://api.discogs.com";

/// eBay search root
pub const EBAY_URL: &str = "https://www.ebay.com";

/// Popsike auction archive root
pub const POPSIKE_URL: &str = "https://www.popsike.com";

/// Cached results stay fresh for this long
const CACHE_TTL_MINUTES: i64 = 10;

/// Bound on every outbound request so a stalled upstream cannot hang a search
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Settings shared by the cache and the three source clients
#[derive(Debug, Clone)]
pub struct Config {
    /// Personal access token for the Discogs API. When absent, Discogs
    /// lookups are disabled entirely.
    pub discogs_token: Option<String>,
    /// Path of the JSON file backing the search cache
    pub cache_file: PathBuf,
    /// Freshness window for cached results
    pub cache_ttl: chrono::Duration,
    /// Per-request network timeout
    pub request_timeout: Duration,
    pub discogs_url: String,
    pub ebay_url: String,
    pub popsike_url: String,
}

impl Config {
    /// Build a config from the environment (`DISCOGS_TOKEN`) and
    /// platform default paths.
    pub fn from_env() -> Self {
        let token = std::env::var("DISCOGS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        Self {
            discogs_token: token,
            cache_file: default_cache_file(),
            cache_ttl: chrono::Duration::minutes(CACHE_TTL_MINUTES),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            discogs_url: DISCOGS_API_URL.to_string(),
            ebay_url: EBAY_URL.to_string(),
            popsike_url: POPSIKE_URL.to_string(),
        }
    }
}

/// Returns the default cache path: ~/.cache/vinyl_scout/search_cache.json
fn default_cache_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vinyl_scout")
        .join("search_cache.json")
}
