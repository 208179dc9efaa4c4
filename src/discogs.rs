//! Discogs API client for release lookup and pricing statistics
//!
//! Searches the database for the best-matching release, then pulls
//! per-condition price suggestions and marketplace stats for it. The
//! whole source is disabled when no token is configured.

use crate::config::Config;
use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Client identifier sent with every Discogs request
const USER_AGENT: &str = "VinylScout/1.0";

/// Public site root used for canonical release links
const DISCOGS_SITE_URL: &str = "https://www.discogs.com";

/// Suggested price for one condition grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub currency: String,
    pub value: f64,
}

/// A currency/value pair from the marketplace stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAmount {
    pub currency: String,
    pub value: f64,
}

/// Aggregate marketplace statistics for a release.
///
/// All fields are optional; a failed stats call leaves the whole
/// object at its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceStats {
    #[serde(default)]
    pub lowest_price: Option<PriceAmount>,
    #[serde(default)]
    pub median_price: Option<PriceAmount>,
    #[serde(default)]
    pub highest_price: Option<PriceAmount>,
    #[serde(default)]
    pub num_for_sale: Option<u64>,
}

/// Consolidated Discogs data for the best-matching release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscogsResult {
    pub title: Option<String>,
    pub year: Option<String>,
    pub cover_image: Option<String>,
    pub url: String,
    pub formats: Vec<String>,
    /// Suggested price per condition grade, empty when the lookup failed
    pub prices: HashMap<String, PriceSuggestion>,
    pub marketplace: MarketplaceStats,
}

/// Response from the database search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    format: Vec<String>,
}

/// Discogs API client
pub struct DiscogsClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl DiscogsClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            token: config.discogs_token.clone(),
            base_url: config.discogs_url.clone(),
        }
    }

    /// Look up the best-matching release and its pricing data.
    ///
    /// Returns `None` when no token is configured, the search fails, or
    /// nothing matches. Follow-up pricing failures degrade to empty
    /// fields instead of discarding the match.
    pub async fn lookup(&self, query: &str) -> Option<DiscogsResult> {
        let token = match &self.token {
            Some(token) => token,
            None => {
                log::warn!("No Discogs token found");
                return None;
            }
        };

        let best_match = match self.search(query, token).await {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                log::info!("No Discogs results for '{}'", query);
                return None;
            }
            Err(e) => {
                log::error!("Discogs API error: {}", e);
                return None;
            }
        };

        let release_id = best_match.id;
        let mut result = DiscogsResult {
            title: best_match.title,
            year: best_match.year,
            cover_image: best_match.cover_image,
            url: format!("{}{}", DISCOGS_SITE_URL, best_match.uri.unwrap_or_default()),
            formats: best_match.format,
            prices: HashMap::new(),
            marketplace: MarketplaceStats::default(),
        };

        // A match with no pricing data is still a valid result.
        match self.price_suggestions(release_id, token).await {
            Ok(prices) => result.prices = prices,
            Err(e) => log::error!("Discogs price suggestion error: {}", e),
        }
        match self.marketplace_stats(release_id, token).await {
            Ok(stats) => result.marketplace = stats,
            Err(e) => log::error!("Discogs stats error: {}", e),
        }

        Some(result)
    }

    /// Search for a release, falling back to master granularity when
    /// the release search comes back empty.
    async fn search(&self, query: &str, token: &str) -> Result<Option<SearchHit>> {
        let mut response = self.search_typed(query, token, "release").await?;
        if response.results.is_empty() {
            response = self.search_typed(query, token, "master").await?;
        }
        // Upstream ranking decides the best match.
        Ok(response.results.into_iter().next())
    }

    async fn search_typed(&self, query: &str, token: &str, kind: &str) -> Result<SearchResponse> {
        let url = format!(
            "{}/database/search?q={}&type={}",
            self.base_url,
            urlencoding::encode(query),
            kind
        );
        log::debug!("Searching Discogs: {}", url);

        let response = self.request(&url, token).send().await?;
        if !response.status().is_success() {
            return Err(ScoutError::HttpStatus(response.status()));
        }
        Ok(response.json::<SearchResponse>().await?)
    }

    async fn price_suggestions(
        &self,
        release_id: u64,
        token: &str,
    ) -> Result<HashMap<String, PriceSuggestion>> {
        let url = format!(
            "{}/marketplace/price_suggestions/{}",
            self.base_url, release_id
        );
        let response = self.request(&url, token).send().await?;
        if !response.status().is_success() {
            return Err(ScoutError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn marketplace_stats(&self, release_id: u64, token: &str) -> Result<MarketplaceStats> {
        let url = format!("{}/marketplace/stats/{}", self.base_url, release_id);
        let response = self.request(&url, token).send().await?;
        if !response.status().is_success() {
            return Err(ScoutError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    fn request(&self, url: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Discogs token={}", token))
            .header("User-Agent", USER_AGENT)
    }
}

#[cfg(test)]
#[path = "discogs_tests.rs"]
mod tests;
