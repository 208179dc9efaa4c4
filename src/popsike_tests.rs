//! Tests for the Popsike sales-history scraper

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{
    absolutize, clean_date, format_usd, parse_last_amount, parse_sales_history, PopsikeScraper,
};
use crate::config::Config;

fn test_config(base_url: &str) -> Config {
    Config {
        discogs_token: None,
        cache_file: std::env::temp_dir().join("vinyl_scout_test_cache.json"),
        cache_ttl: chrono::Duration::minutes(10),
        request_timeout: std::time::Duration::from_secs(5),
        discogs_url: base_url.to_string(),
        ebay_url: base_url.to_string(),
        popsike_url: base_url.to_string(),
    }
}

fn sale_row(title: &str, date: &str, price: &str, href: &str) -> String {
    format!(
        r#"<div class="row">
            <div class="add-desc-box"><div class="add-title"><a href="{href}">{title}</a></div></div>
            <div class="date">{date}</div>
            <div class="price-box"><div class="item-price">{price}</div></div>
        </div>"#
    )
}

fn results_page(rows: &[String]) -> String {
    format!(
        r#"<html><body><div class="item-list make-list">{}</div></body></html>"#,
        rows.join("\n")
    )
}

// ── helpers ──────────────────────────────────────────────────────────

#[test]
fn clean_date_keeps_standard_format() {
    assert_eq!(clean_date("Jul 14, 2023"), "Jul 14, 2023");
}

#[test]
fn clean_date_extracts_from_polluted_text() {
    assert_eq!(
        clean_date("Favourite Auctions sign in or register Jul 14, 2023"),
        "Jul 14, 2023"
    );
}

#[test]
fn clean_date_falls_back_to_pollution_marker() {
    assert_eq!(
        clean_date("Favourite Auctions sign in or register 14 july"),
        "14 july"
    );
}

#[test]
fn clean_date_passes_through_unrecognized_text() {
    assert_eq!(clean_date("sometime in 2023"), "sometime in 2023");
    assert_eq!(clean_date("Unknown Date"), "Unknown Date");
}

#[test]
fn parse_last_amount_takes_final_number() {
    // Multi-currency cell: the last amount is the primary currency.
    assert_eq!(parse_last_amount("£ 950 $ 1,200"), Some(1200.0));
    assert_eq!(parse_last_amount("1,590"), Some(1590.0));
}

#[test]
fn parse_last_amount_no_numbers() {
    assert_eq!(parse_last_amount("no price listed"), None);
    assert_eq!(parse_last_amount(""), None);
}

#[test]
fn format_usd_groups_thousands() {
    assert_eq!(format_usd(1200.0), "$1,200.00");
    assert_eq!(format_usd(45.5), "$45.50");
    assert_eq!(format_usd(1234567.89), "$1,234,567.89");
    assert_eq!(format_usd(999.0), "$999.00");
}

#[test]
fn absolutize_rewrites_relative_links() {
    assert_eq!(
        absolutize("../item.php?item=1", "https://www.popsike.com"),
        "https://www.popsike.com/item.php?item=1"
    );
    assert_eq!(
        absolutize("item.php?item=2", "https://www.popsike.com"),
        "https://www.popsike.com/item.php?item=2"
    );
    assert_eq!(
        absolutize("https://www.popsike.com/item.php?item=3", "https://www.popsike.com"),
        "https://www.popsike.com/item.php?item=3"
    );
}

// ── page parsing ─────────────────────────────────────────────────────

#[test]
fn parse_page_extracts_listings() {
    let rows = vec![
        sale_row(
            "PINK FLOYD Dark Side Of The Moon UK 1st",
            "Jul 14, 2023",
            "£ 950 $ 1,200",
            "../item.php?item=1",
        ),
        sale_row(
            "PINK FLOYD DSOTM solid blue triangle",
            "Mar 2, 2022",
            "$ 800",
            "../item.php?item=2",
        ),
    ];

    let result = parse_sales_history(&results_page(&rows), "https://www.popsike.com").unwrap();

    assert_eq!(result.count, 2);
    let first = &result.listings[0];
    assert_eq!(first.title, "PINK FLOYD Dark Side Of The Moon UK 1st");
    assert_eq!(first.date, "Jul 14, 2023");
    assert!((first.price_val - 1200.0).abs() < 0.001);
    assert_eq!(first.price, "$1,200.00");
    assert_eq!(first.link, "https://www.popsike.com/item.php?item=1");
}

#[test]
fn rows_without_title_anchor_or_price_are_skipped() {
    let rows = vec![
        // No anchor in the title box
        r#"<div class="row">
            <div class="add-title">orphan text</div>
            <div class="price-box"><div class="item-price">$ 100</div></div>
        </div>"#
            .to_string(),
        // No price box
        r#"<div class="row">
            <div class="add-title"><a href="../item.php?item=5">Priceless LP</a></div>
            <div class="date">Jan 1, 2024</div>
        </div>"#
            .to_string(),
        sale_row("Kept LP", "Jan 2, 2024", "$ 55", "../item.php?item=6"),
    ];

    let result = parse_sales_history(&results_page(&rows), "https://www.popsike.com").unwrap();
    assert_eq!(result.count, 1);
    assert_eq!(result.listings[0].title, "Kept LP");
}

#[test]
fn missing_date_becomes_unknown() {
    let rows = vec![r#"<div class="row">
        <div class="add-title"><a href="../item.php?item=7">Undated LP</a></div>
        <div class="price-box"><div class="item-price">$ 75</div></div>
    </div>"#
        .to_string()];

    let result = parse_sales_history(&results_page(&rows), "https://www.popsike.com").unwrap();
    assert_eq!(result.listings[0].date, "Unknown Date");
}

#[test]
fn count_covers_all_rows_but_display_is_truncated() {
    let rows: Vec<String> = (1..=8)
        .map(|i| {
            sale_row(
                &format!("Listing {i}"),
                "Jul 14, 2023",
                &format!("$ {i}00"),
                &format!("../item.php?item={i}"),
            )
        })
        .collect();

    let result = parse_sales_history(&results_page(&rows), "https://www.popsike.com").unwrap();
    assert_eq!(result.listings.len(), 5);
    assert_eq!(result.count, 8);
}

#[test]
fn page_without_rows_is_absent() {
    assert!(parse_sales_history("<html><body></body></html>", "https://www.popsike.com").is_none());
}

// ── full fetch path ──────────────────────────────────────────────────

#[tokio::test]
async fn search_joins_query_words_with_plus() {
    let server = MockServer::start().await;

    let rows = vec![sale_row(
        "LED ZEPPELIN IV UK plum",
        "Jul 14, 2023",
        "$ 250",
        "../item.php?item=1",
    )];

    Mock::given(method("GET"))
        .and(path("/php/quicksearch.php"))
        .and(query_param("searchtext", "Led+Zeppelin+IV"))
        .and(query_param("sortord", "dprice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&rows)))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = PopsikeScraper::new(&test_config(&server.uri()));
    let result = scraper.search("Led Zeppelin IV").await.unwrap();

    assert_eq!(result.count, 1);
    // Relative links are rewritten against the configured site root.
    assert_eq!(
        result.listings[0].link,
        format!("{}/item.php?item=1", server.uri())
    );
}

#[tokio::test]
async fn search_returns_none_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/php/quicksearch.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = PopsikeScraper::new(&test_config(&server.uri()));
    assert!(scraper.search("Led Zeppelin IV").await.is_none());
}
