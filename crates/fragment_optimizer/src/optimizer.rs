//! # Optimizer
//!
//! The single synchronous entry point: validate, pool, allocate, report.
//!
//! ```text
//! ListingSnapshot ──> CandidatePool::build ──> allocate ──> AllocationReport
//!                      (price ceiling)        (greedy)     (sorted by name)
//! ```
//!
//! Every run owns a fresh pool. Nothing but the catalog and config outlives it.

use tracing::{info, warn};

use crate::catalog::ItemCatalog;
use crate::config::OptimizerConfig;
use crate::engine::allocate;
use crate::error::{OptimizerError, OptimizerResult};
use crate::listing::ListingSnapshot;
use crate::pool::CandidatePool;
use crate::report::AllocationReport;

/// Plans the cheapest purchases for a fragment target.
#[derive(Clone, Copy, Debug, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    /// Creates an optimizer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the config does not validate.
    pub fn new(config: OptimizerConfig) -> OptimizerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Runs one allocation against a listing snapshot.
    ///
    /// Items missing from the snapshot are skipped. Running out of supply is
    /// reported through [`AllocationReport::is_partial`], not as an error.
    ///
    /// # Errors
    ///
    /// - `InvalidTarget` if `target` is zero
    /// - `InvalidFragmentYield` for a zero-yield catalog item
    /// - `ArithmeticOverflow` if totals do not fit
    pub fn optimize(
        &self,
        target: u64,
        catalog: &ItemCatalog,
        listings: &ListingSnapshot,
    ) -> OptimizerResult<AllocationReport> {
        if target == 0 {
            return Err(OptimizerError::InvalidTarget(target));
        }

        let mut pool = CandidatePool::build(catalog, listings, self.config.price_ceiling)?;
        let allocation = allocate(&mut pool, target)?;
        let report = AllocationReport::from_allocation(&allocation);

        info!(
            target,
            candidates = pool.len(),
            purchases = allocation.events.len(),
            fragments = report.total_fragments,
            spent = %report.total_spent,
            "allocation complete"
        );
        if report.is_partial() {
            warn!(
                target,
                shortfall = report.shortfall(),
                listed_items = listings.len(),
                "liquidity exhausted before target"
            );
        }

        Ok(report)
    }
}
