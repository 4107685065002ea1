//! # Fragment Optimizer
//!
//! Plans the cheapest way to buy a target number of salvage fragments from a
//! snapshot of market sell listings.
//!
//! ## Design Principles
//!
//! 1. **Zero floating point** - All money is fixed-point ([`Price`], 6 decimals)
//! 2. **Deterministic** - Same catalog and snapshot = same purchases, same order
//! 3. **Greedy by cost per fragment** - Cheapest `price / yield` first, ties by
//!    discovery order
//! 4. **External configuration** - Item table and price ceiling live in TOML
//!
//! ## Pipeline
//!
//! ```text
//! ListingSnapshot ─> CandidatePool ─> allocate() ─> AllocationReport
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use fragment_optimizer::{ItemCatalog, ListingSnapshot, Optimizer, OptimizerConfig};
//!
//! let catalog = ItemCatalog::builtin()?;
//! let optimizer = Optimizer::new(OptimizerConfig::default())?;
//!
//! // Listings come from the market collector.
//! let report = optimizer.optimize(1_000, &catalog, &listings)?;
//! println!("{} fragments for {}", report.total_fragments, report.total_spent);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod listing;
pub mod optimizer;
pub mod pool;
pub mod report;

pub use catalog::{ItemCatalog, ItemDescriptor, ItemId};
pub use config::{OptimizerConfig, DEFAULT_PRICE_CEILING};
pub use engine::{allocate, Allocation, PurchaseEvent};
pub use error::{OptimizerError, OptimizerResult};
pub use fixed_point::{cmp_per_fragment, Price};
pub use listing::{parse_sell_order_graph, ListingSnapshot, PriceTier};
pub use optimizer::Optimizer;
pub use pool::{Candidate, CandidatePool};
pub use report::{AllocationReport, ItemBreakdown};
