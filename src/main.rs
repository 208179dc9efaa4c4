//! Vinyl Scout - vinyl record price lookup
//!
//! Resolves a free-text release query against Discogs, eBay sold
//! listings and Popsike, and prints the consolidated result as JSON.

use clap::Parser;
use std::path::PathBuf;
use vinyl_scout::aggregator::Aggregator;
use vinyl_scout::config::Config;
use vinyl_scout::history::SearchHistory;

/// Vinyl record price scout - combines Discogs, eBay and Popsike pricing data
#[derive(Parser, Debug)]
#[command(name = "vinyl_scout")]
#[command(version, about, long_about = None)]
struct Args {
    /// Release to search for (artist, title, ...)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Print recent searches and exit
    #[arg(long, default_value_t = false)]
    history: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Path to the search cache file (default: platform cache dir)
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Path to the search history database (default: platform data dir)
    #[arg(long)]
    database: Option<PathBuf>,
}

/// Returns the default history path: ~/.local/share/vinyl_scout/history.db
fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vinyl_scout")
        .join("history.db")
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(path) = args.cache_file {
        config.cache_file = path;
    }

    let history_path = args.database.unwrap_or_else(default_history_path);
    let history = match SearchHistory::open(&history_path) {
        Ok(history) => Some(history),
        Err(e) => {
            log::warn!("Search history disabled: {}", e);
            None
        }
    };

    if args.history {
        let history = match &history {
            Some(history) => history,
            None => std::process::exit(1),
        };
        match history.recent(5) {
            Ok(entries) => {
                for (query, timestamp) in entries {
                    println!("{}  {}", timestamp, query);
                }
            }
            Err(e) => {
                log::error!("Failed to read search history: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let query = args.query.join(" ").trim().to_string();
    if query.is_empty() {
        log::error!("No query provided");
        std::process::exit(1);
    }

    if let Some(history) = &history {
        if let Err(e) = history.record(&query) {
            log::warn!("Failed to record search: {}", e);
        }
    }

    let aggregator = Aggregator::new(&config);
    let result = aggregator.resolve(&query).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };

    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize result: {}", e);
            std::process::exit(1);
        }
    }
}
