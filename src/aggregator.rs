//! Query orchestration: cache lookup, source fan-out, result assembly

use crate::cache::PriceCache;
use crate::config::Config;
use crate::discogs::{DiscogsClient, DiscogsResult};
use crate::ebay::{EbayResult, EbayScraper};
use crate::popsike::{PopsikeResult, PopsikeScraper};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Consolidated pricing data for one search query.
///
/// Each source field is `None` when that source failed or found
/// nothing; the envelope itself is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub query: String,
    pub discogs: Option<DiscogsResult>,
    pub ebay: Option<EbayResult>,
    pub popsike: Option<PopsikeResult>,
    pub timestamp: String,
}

/// Fans a query out to all pricing sources behind the TTL cache
pub struct Aggregator {
    cache: PriceCache,
    discogs: DiscogsClient,
    ebay: EbayScraper,
    popsike: PopsikeScraper,
}

impl Aggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            cache: PriceCache::new(config.cache_file.clone(), config.cache_ttl),
            discogs: DiscogsClient::new(config),
            ebay: EbayScraper::new(config),
            popsike: PopsikeScraper::new(config),
        }
    }

    /// Resolve a query into a consolidated pricing result.
    ///
    /// A fresh cached result is returned unchanged. Otherwise the three
    /// sources are queried concurrently and whatever they return is
    /// assembled into the envelope. Results with at least one populated
    /// source are cached; all-absent results are not, so a transient
    /// outage is retried on the next call instead of pinned for the
    /// whole TTL window.
    pub async fn resolve(&self, query: &str) -> AggregateResult {
        if let Some(cached) = self.cache.get(query) {
            return cached;
        }

        let (discogs, ebay, popsike) = tokio::join!(
            self.discogs.lookup(query),
            self.ebay.search(query),
            self.popsike.search(query),
        );

        let result = AggregateResult {
            query: query.to_string(),
            discogs,
            ebay,
            popsike,
            timestamp: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        };

        if result.discogs.is_some() || result.ebay.is_some() || result.popsike.is_some() {
            self.cache.put(query, &result);
        }

        result
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
