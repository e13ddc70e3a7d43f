//! dehum-sizing - size dehumidifiers for a room or pool hall from the CLI
//!
//! Usage:
//!   dehum-sizing --request request.json --catalog catalog.json
//!   dehum-sizing --request request.json --catalog catalog.json --rules custom.toml --pretty
//!
//! Prints `{"catalogVersion": ..., "result": ...}` to stdout. Logs go to
//! stderr; set RUST_LOG to change the level.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dehum_sizing::catalog::{lint_catalog, load_catalog};
use dehum_sizing::sizing::{default_rules, load_rules, SizingEngine, SizingRequest, SizingResult};

/// Dehumidifier sizing and multi-unit recommendation
#[derive(Parser, Debug)]
#[command(name = "dehum-sizing", version, about, long_about = None)]
struct Args {
    /// Path to the sizing request (JSON)
    #[arg(short, long)]
    request: PathBuf,

    /// Path to the product catalog (JSON)
    #[arg(short, long)]
    catalog: PathBuf,

    /// Path to custom rule tables (TOML)
    ///
    /// Defaults to the rules embedded in the binary.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    catalog_version: Option<&'a str>,
    result: &'a SizingResult,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => {
            info!("Loading rules from {:?}", path);
            load_rules(path).with_context(|| format!("Failed to load rules {:?}", path))?
        }
        None => default_rules(),
    };

    let content = std::fs::read_to_string(&args.request)
        .with_context(|| format!("Failed to read request {:?}", args.request))?;
    let request: SizingRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid request {:?}", args.request))?;

    let catalog = load_catalog(&args.catalog)?;
    for warning in lint_catalog(&catalog) {
        warn!("Catalog entry {} ({}): {}", warning.sku, warning.field, warning.message);
    }

    let engine = SizingEngine::new(rules);
    info!("Using {} derating curve", engine.curve_name());
    let result = engine.compute(&request, &catalog.products)?;

    let output = Output {
        catalog_version: catalog.version.as_deref(),
        result: &result,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
