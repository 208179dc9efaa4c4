//! Vinyl Scout - consolidated vinyl record pricing
//!
//! Resolves a free-text release query into a pricing profile by combining
//! the Discogs database API with scraped eBay sold listings and Popsike
//! sales history, behind a file-backed TTL cache.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod discogs;
pub mod ebay;
pub mod error;
pub mod history;
pub mod popsike;

pub use aggregator::{AggregateResult, Aggregator};
pub use config::Config;
pub use error::{Result, ScoutError};
