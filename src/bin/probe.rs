//! Diagnostic probe: run one search across every configured engine and
//! print the outcome as JSON on stdout.
//!
//! ```text
//! serpsift-probe <keyword> [target]
//! ```
//!
//! Config is read from `$SERPSIFT_CONFIG_DIR/config.toml` (or the platform
//! config directory) when present. Logs go to stderr; set `RUST_LOG` to
//! change verbosity.

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::Context;
use serpsift::{MemoryStore, SearchService, SerpConfig, logging};

const USAGE: &str = "usage: serpsift-probe <keyword> [target]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(keyword) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let target = parse_target(args.next())?;

    let config = SerpConfig::load(None).context("failed to load config")?;
    logging::init(&config.logging)?;

    let store = Arc::new(MemoryStore::new(config.storage.bucket_seconds));
    let service = SearchService::from_config(&config, store)?;
    let outcome = service.search(&keyword, target).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// The optional per-engine target. Zero is rejected.
fn parse_target(arg: Option<String>) -> anyhow::Result<Option<usize>> {
    arg.map(|t| t.parse::<NonZeroUsize>().map(NonZeroUsize::get))
        .transpose()
        .with_context(|| format!("target must be a positive number\n{USAGE}"))
}
