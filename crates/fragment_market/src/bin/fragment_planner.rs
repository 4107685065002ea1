//! # Fragment Planner
//!
//! Collects sell listings for every catalog item, plans the cheapest purchase
//! of a fragment target and prints the report as JSON.
//!
//! The report is the only thing written to stdout. Progress, retries and
//! failed fetches are logged to stderr (`RUST_LOG` overrides the `info`
//! default).
//!
//! ## Usage
//!
//! ```bash
//! # Plan against saved histogram bodies (<dir>/<item_id>.json)
//! fragment_planner --target 1000 --snapshots ./snapshots
//!
//! # Plan against the live market (build with --features http)
//! fragment_planner --target 1000 --fetch --config planner.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use fragment_market::{Collector, ListingSource, PlannerConfig, SnapshotDirSource};
use fragment_optimizer::{AllocationReport, ItemCatalog, ItemId, Optimizer, OptimizerError, Price};

/// Where listings come from.
#[derive(Debug, PartialEq, Eq)]
enum Listings {
    Snapshots(PathBuf),
    Fetch,
}

#[derive(Debug)]
struct Args {
    target: u64,
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
    listings: Listings,
    ceiling: Option<Price>,
}

fn print_usage() {
    println!("Usage: fragment_planner --target <N> (--snapshots <DIR> | --fetch) [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -n, --target <N>          Fragments to acquire (required, > 0)");
    println!("  -s, --snapshots <DIR>     Read <DIR>/<item_id>.json histogram bodies");
    println!("  -f, --fetch               Fetch live listings (requires the http feature)");
    println!("  -c, --config <FILE>       Planner TOML config (default: built-in defaults)");
    println!("      --catalog <FILE>      Item catalog TOML (default: built-in catalog)");
    println!("      --ceiling <PRICE>     Override optimizer.price_ceiling");
    println!("  -h, --help                Show this help");
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

/// Returns `Ok(None)` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut target = None;
    let mut config = None;
    let mut catalog = None;
    let mut listings = None;
    let mut ceiling = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--target" | "-n" => {
                let raw = value(args, i, flag)?;
                let parsed: u64 = raw
                    .parse()
                    .map_err(|_| format!("invalid target: {raw}"))?;
                target = Some(parsed);
                i += 1;
            }
            "--snapshots" | "-s" => {
                listings = Some(Listings::Snapshots(PathBuf::from(value(args, i, flag)?)));
                i += 1;
            }
            "--fetch" | "-f" => listings = Some(Listings::Fetch),
            "--config" | "-c" => {
                config = Some(PathBuf::from(value(args, i, flag)?));
                i += 1;
            }
            "--catalog" => {
                catalog = Some(PathBuf::from(value(args, i, flag)?));
                i += 1;
            }
            "--ceiling" => {
                let raw = value(args, i, flag)?;
                ceiling = Some(raw.parse::<Price>().map_err(|e| e.to_string())?);
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Some(Args {
        target: target.ok_or("--target is required")?,
        config,
        catalog,
        listings: listings.ok_or("one of --snapshots or --fetch is required")?,
        ceiling,
    }))
}

#[cfg(feature = "http")]
fn live_source(config: &PlannerConfig) -> Result<Box<dyn ListingSource>, String> {
    fragment_market::HttpListingSource::new(config.http.clone())
        .map(|source| Box::new(source) as Box<dyn ListingSource>)
        .map_err(|e| e.to_string())
}

#[cfg(not(feature = "http"))]
fn live_source(_config: &PlannerConfig) -> Result<Box<dyn ListingSource>, String> {
    Err(fragment_market::MarketError::Unsupported(
        "--fetch needs fragment_planner built with --features http".to_string(),
    )
    .to_string())
}

fn open_source(listings: &Listings, config: &PlannerConfig) -> Result<Box<dyn ListingSource>, String> {
    match listings {
        Listings::Snapshots(dir) => Ok(Box::new(SnapshotDirSource::new(dir.clone()))),
        Listings::Fetch => live_source(config),
    }
}

/// Loads config and catalog, collects listings through `open` and plans.
///
/// Every configuration error, including a zero target, is reported before
/// `open` is called.
fn plan<F>(args: &Args, open: F) -> Result<AllocationReport, String>
where
    F: FnOnce(&Listings, &PlannerConfig) -> Result<Box<dyn ListingSource>, String>,
{
    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_toml_file(path).map_err(|e| e.to_string())?,
        None => PlannerConfig::default(),
    };
    if let Some(ceiling) = args.ceiling {
        config.optimizer.price_ceiling = ceiling;
    }
    config.validate().map_err(|e| e.to_string())?;

    let catalog = match &args.catalog {
        Some(path) => ItemCatalog::from_toml_file(path),
        None => ItemCatalog::builtin(),
    }
    .map_err(|e| e.to_string())?;

    let optimizer = Optimizer::new(config.optimizer).map_err(|e| e.to_string())?;
    let collector = Collector::new(config.collector).map_err(|e| e.to_string())?;

    if args.target == 0 {
        return Err(OptimizerError::InvalidTarget(0).to_string());
    }

    let source = open(&args.listings, &config)?;
    let items: Vec<ItemId> = catalog.ids().collect();
    let (listings, _) = collector.collect(source.as_ref(), &items);

    optimizer
        .optimize(args.target, &catalog, &listings)
        .map_err(|e| e.to_string())
}

fn run(args: &Args) -> Result<(), String> {
    let report = plan(args, open_source)?;
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();

    let args = match parse_args(&argv) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            return ExitCode::from(2);
        }
    };

    init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
