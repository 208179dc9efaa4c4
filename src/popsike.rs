//! Popsike auction-archive scraper
//!
//! Fetches the sales-history page sorted by descending price and
//! extracts title/date/price rows. Parsing is best-effort: any row that
//! fails to yield a usable listing is skipped, never aborting the
//! whole scrape.

use crate::config::Config;
use crate::error::{Result, ScoutError};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

lazy_static! {
    static ref ROW: Selector = Selector::parse(".item-list.make-list .row").unwrap();
    static ref TITLE_LINK: Selector = Selector::parse(".add-title a").unwrap();
    static ref DATE: Selector = Selector::parse(".date").unwrap();
    static ref PRICE_BOX: Selector = Selector::parse(".price-box .item-price").unwrap();
    /// "Jul 14, 2023" style month-abbreviation dates
    static ref DATE_RE: Regex = Regex::new(r"[A-Z][a-z]{2}\s\d{1,2},\s\d{4}").unwrap();
    /// Runs of digits and comma separators inside a price cell
    static ref AMOUNT_RE: Regex = Regex::new(r"[\d,]+").unwrap();
}

/// One archived sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopsikeListing {
    pub title: String,
    /// Best-effort sale date, or "Unknown Date"
    pub date: String,
    /// Formatted price, e.g. "$1,200.00"
    pub price: String,
    pub price_val: f64,
    pub link: String,
}

/// Sales-history scrape result.
///
/// `listings` keeps the first five rows in page order; `count` covers
/// every row that parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopsikeResult {
    pub listings: Vec<PopsikeListing>,
    pub count: usize,
}

/// Popsike sales-history scraper
pub struct PopsikeScraper {
    client: reqwest::Client,
    base_url: String,
}

impl PopsikeScraper {
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
            base_url: config.popsike_url.clone(),
        }
    }

    /// Scrape the sales history for `query`.
    ///
    /// Returns `None` on network failure or when no row yields a usable
    /// listing.
    pub async fn search(&self, query: &str) -> Option<PopsikeResult> {
        let html = match self.fetch(query).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Popsike scraping error: {}", e);
                return None;
            }
        };
        parse_sales_history(&html, &self.base_url)
    }

    async fn fetch(&self, query: &str) -> Result<String> {
        // Site convention: spaces become "+" before encoding.
        let joined = query.replace(' ', "+");
        let url = format!(
            "{}/php/quicksearch.php?searchtext={}&sortord=dprice",
            self.base_url,
            urlencoding::encode(&joined)
        );
        log::debug!("Fetching Popsike sales history: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoutError::HttpStatus(response.status()));
        }
        Ok(response.text().await?)
    }
}

/// Parse a sales-history page into listings.
///
/// Returns `None` when no row survives parsing.
fn parse_sales_history(html: &str, base_url: &str) -> Option<PopsikeResult> {
    let document = Html::parse_document(html);

    let mut listings: Vec<PopsikeListing> = document
        .select(&ROW)
        .filter_map(|row| parse_row(row, base_url))
        .collect();

    if listings.is_empty() {
        return None;
    }

    let count = listings.len();
    listings.truncate(5);

    Some(PopsikeResult { listings, count })
}

/// Extract one listing from a result row.
///
/// Rows without a title anchor or a parseable price are dropped.
fn parse_row(row: ElementRef, base_url: &str) -> Option<PopsikeListing> {
    let anchor = row.select(&TITLE_LINK).next()?;
    let title = element_text(anchor);
    let link = absolutize(anchor.value().attr("href")?, base_url);

    let date = match row.select(&DATE).next() {
        Some(element) => clean_date(&element_text(element)),
        None => "Unknown Date".to_string(),
    };

    let price_text = element_text(row.select(&PRICE_BOX).next()?);
    let price_val = parse_last_amount(&price_text)?;

    Some(PopsikeListing {
        title,
        date,
        price: format_usd(price_val),
        price_val,
        link,
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Rewrite a relative listing link against the site root.
fn absolutize(link: &str, base_url: &str) -> String {
    if link.starts_with("http") {
        return link.to_string();
    }
    let trimmed = link.trim_start_matches("../").trim_start_matches('/');
    format!("{}/{}", base_url, trimmed)
}

/// Reduce scraped date text to a plain "Mon D, YYYY" date.
///
/// The date cell can be polluted with account-menu text ending in
/// "register"; whatever follows that marker is kept as a fallback when
/// no date pattern matches.
fn clean_date(raw: &str) -> String {
    if let Some(matched) = DATE_RE.find(raw) {
        return matched.as_str().to_string();
    }
    if let Some(idx) = raw.rfind("register") {
        return raw[idx + "register".len()..].trim().to_string();
    }
    raw.to_string()
}

/// Extract the numeric price from a price cell.
///
/// The cell can carry several currency renderings; the last run of
/// digits and commas is taken as the primary-currency amount.
fn parse_last_amount(text: &str) -> Option<f64> {
    let matched = AMOUNT_RE.find_iter(text).last()?;
    matched.as_str().replace(',', "").parse().ok()
}

/// Format a non-negative amount as "$1,234.56"
fn format_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${}.{:02}", grouped, frac)
}

#[cfg(test)]
#[path = "popsike_tests.rs"]
mod tests;
