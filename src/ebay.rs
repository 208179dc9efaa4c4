//! eBay sold-listings scraper
//!
//! Fetches a completed/sold search results page and extracts price
//! points. eBay blocks unadorned HTTP clients, so requests carry a full
//! browser header set. The listing markup has two known layouts; a
//! fallback selector covers the older one.

use crate::config::Config;
use crate::error::{Result, ScoutError};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Appended to every query to bias results toward vinyl pressings
const VINYL_QUALIFIER: &str = "vinyl record";

lazy_static! {
    static ref ROW_PRIMARY: Selector = Selector::parse(".s-item__wrapper").unwrap();
    static ref ROW_FALLBACK: Selector = Selector::parse("li.s-item").unwrap();
    static ref NO_TITLE: Selector = Selector::parse(".s-item__no-title").unwrap();
    static ref TITLE: Selector = Selector::parse(".s-item__title").unwrap();
    static ref PRICE: Selector = Selector::parse(".s-item__price").unwrap();
    static ref LINK: Selector = Selector::parse(".s-item__link").unwrap();
    /// First decimal number in a price string, allowing comma thousands groups
    static ref PRICE_RE: Regex =
        Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?").unwrap();
}

/// One sold listing with its raw and parsed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoldListing {
    pub title: String,
    /// Price text as shown on the page, e.g. "$24.99"
    pub price: String,
    pub price_val: f64,
    pub link: String,
}

/// Summary statistics over every parsed price on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EbayStats {
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub count: usize,
}

/// Sold-listings scrape result.
///
/// `sold_listings` keeps only the first five rows in page order, but
/// `stats` covers every price that parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EbayResult {
    pub sold_listings: Vec<SoldListing>,
    pub stats: EbayStats,
}

/// eBay completed/sold listings scraper
pub struct EbayScraper {
    client: reqwest::Client,
    base_url: String,
}

impl EbayScraper {
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
            base_url: config.ebay_url.clone(),
        }
    }

    /// Scrape completed/sold listings for `query`.
    ///
    /// Returns `None` on any network failure or when no row yields a
    /// parseable price.
    pub async fn search(&self, query: &str) -> Option<EbayResult> {
        let html = match self.fetch(query).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("eBay scraping error: {}", e);
                return None;
            }
        };
        parse_sold_listings(&html)
    }

    async fn fetch(&self, query: &str) -> Result<String> {
        let full_query = format!("{} {}", query, VINYL_QUALIFIER);
        let url = format!(
            "{}/sch/i.html?_nkw={}&LH_Sold=1&LH_Complete=1&_ipg=60",
            self.base_url,
            urlencoding::encode(&full_query)
        );
        log::debug!("Fetching eBay sold listings: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Upgrade-Insecure-Requests", "1")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("Cache-Control", "max-age=0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoutError::HttpStatus(response.status()));
        }
        Ok(response.text().await?)
    }
}

/// Parse a search results page into listings plus price statistics.
///
/// Returns `None` when no row yields a usable price.
fn parse_sold_listings(html: &str) -> Option<EbayResult> {
    let document = Html::parse_document(html);

    let mut rows: Vec<ElementRef> = document.select(&ROW_PRIMARY).collect();
    if rows.is_empty() {
        rows = document.select(&ROW_FALLBACK).collect();
    }

    let mut items = Vec::new();
    let mut prices = Vec::new();

    for row in rows {
        if let Some(listing) = parse_row(row) {
            prices.push(listing.price_val);
            items.push(listing);
        }
    }

    if prices.is_empty() {
        return None;
    }

    let average = prices.iter().sum::<f64>() / prices.len() as f64;
    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let count = prices.len();

    items.truncate(5);

    Some(EbayResult {
        sold_listings: items,
        stats: EbayStats {
            average_price: (average * 100.0).round() / 100.0,
            min_price: min,
            max_price: max,
            count,
        },
    })
}

/// Extract one listing from a result row.
///
/// Rows flagged as title-less placeholders, rows missing a title or
/// price element, and rows whose price fails to parse are all dropped.
fn parse_row(row: ElementRef) -> Option<SoldListing> {
    if row.select(&NO_TITLE).next().is_some() {
        return None;
    }

    let title = element_text(row.select(&TITLE).next()?);
    let price = element_text(row.select(&PRICE).next()?);
    let link = row
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap_or("#")
        .to_string();

    let price_val = parse_price(&price)?;

    Some(SoldListing {
        title,
        price,
        price_val,
        link,
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse a scraped price string into its numeric value.
///
/// Takes the first decimal number in the text, stripping comma
/// thousands separators: "$1,200.00" -> 1200.0, "Sold $45.99" -> 45.99.
/// Price ranges keep the lower bound. Returns `None` when no number is
/// present.
pub(crate) fn parse_price(text: &str) -> Option<f64> {
    let matched = PRICE_RE.find(text)?;
    matched.as_str().replace(',', "").parse().ok()
}

#[cfg(test)]
#[path = "ebay_tests.rs"]
mod tests;
