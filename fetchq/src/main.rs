//! fetchq - polite batch URL fetcher
//!
//! Fetches a list of URLs through the rate-limited retrying queue. One URL
//! failing never halts the batch: the failure is logged and the run moves on
//! to the next URL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetchq::{FetchQueue, QueueConfig};

/// Command-line arguments for fetchq
#[derive(Parser, Debug)]
#[command(name = "fetchq")]
#[command(about = "Rate-limited, retrying batch URL fetcher")]
#[command(version)]
struct Args {
    /// URLs to fetch
    urls: Vec<String>,

    /// File with one URL per line ('#' starts a comment)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// TOML file overriding the queue's default limits
    #[arg(short, long, env = "FETCHQ_CONFIG")]
    config: Option<PathBuf>,

    /// Print the per-URL summary as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

/// Per-URL batch outcome
#[derive(Debug, Serialize)]
struct FetchOutcome {
    url: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetchq=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let urls = collect_urls(&args)?;
    if urls.is_empty() {
        bail!("No URLs given (pass them as arguments or via --input)");
    }

    let config = match &args.config {
        Some(path) => QueueConfig::from_toml_file(path)
            .with_context(|| format!("Loading config from {}", path.display()))?,
        None => QueueConfig::default(),
    };

    info!(
        urls = urls.len(),
        max_in_flight = config.max_in_flight,
        window_max_starts = config.window_max_starts,
        window_ms = config.window_ms,
        "Starting batch fetch"
    );

    let queue = Arc::new(FetchQueue::new(config)?);

    let mut join_set = JoinSet::new();
    for url in urls {
        let queue = Arc::clone(&queue);
        join_set.spawn(async move {
            match queue.fetch(&url).await {
                Ok(body) => {
                    info!(url = %url, bytes = body.len(), "Fetched");
                    FetchOutcome {
                        url,
                        ok: true,
                        status: None,
                        bytes: Some(body.len()),
                        error: None,
                    }
                }
                Err(err) => {
                    // Logged and carried in the summary; the batch continues
                    warn!(url = %url, error = %err, "Fetch failed, continuing batch");
                    FetchOutcome {
                        status: err.status(),
                        url,
                        ok: false,
                        bytes: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        });
    }

    let mut outcomes = Vec::new();
    while let Some(result) = join_set.join_next().await {
        outcomes.push(result.context("Fetch task panicked")?);
    }

    let succeeded = outcomes.iter().filter(|o| o.ok).count();
    let failed = outcomes.len() - succeeded;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            match (&outcome.error, outcome.bytes) {
                (None, Some(bytes)) => println!("OK   {} ({} bytes)", outcome.url, bytes),
                (Some(error), _) => println!("FAIL {} ({})", outcome.url, error),
                _ => {}
            }
        }
    }

    info!(succeeded, failed, "Batch fetch complete");

    if succeeded == 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Merge positional URLs with the optional input file.
fn collect_urls(args: &Args) -> Result<Vec<String>> {
    let mut urls = args.urls.clone();

    if let Some(path) = &args.input {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Reading URL list from {}", path.display()))?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            urls.push(line.to_string());
        }
    }

    Ok(urls)
}
