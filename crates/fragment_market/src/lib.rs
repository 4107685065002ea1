//! # Fragment Market
//!
//! Gathers market sell listings for the fragment optimizer.
//!
//! ## Responsibilities
//!
//! - [`ListingSource`]: where tiers come from (saved snapshots, live HTTP)
//! - [`Collector`]: bounded worker fan-out with retries; tolerates failures
//! - [`PlannerConfig`]: one TOML file for optimizer, collector and HTTP
//!
//! The optimizer never fetches or retries. It receives the finished
//! [`ListingSnapshot`](fragment_optimizer::ListingSnapshot) as a value.
//!
//! ## Example
//!
//! ```rust,ignore
//! let catalog = ItemCatalog::builtin()?;
//! let source = SnapshotDirSource::new("snapshots/");
//! let (listings, stats) = Collector::default().collect(&source, &catalog.ids().collect::<Vec<_>>());
//! let report = Optimizer::default().optimize(1_000, &catalog, &listings)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collector;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod source;

pub use collector::{CollectionStats, Collector, CollectorConfig};
pub use config::{HttpSourceConfig, PlannerConfig, DEFAULT_ENDPOINT};
pub use error::{MarketError, MarketResult};
#[cfg(feature = "http")]
pub use http::HttpListingSource;
pub use source::{ListingSource, SnapshotDirSource};
