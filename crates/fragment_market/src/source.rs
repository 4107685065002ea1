//! # Listing Sources
//!
//! Anything that can produce an item's sell tiers. Sources are shared across
//! collector worker threads, so they must be `Send + Sync`.

use std::path::{Path, PathBuf};

use fragment_optimizer::{parse_sell_order_graph, ItemId, PriceTier};

use crate::error::{MarketError, MarketResult};

/// Produces the current sell tiers of one item.
pub trait ListingSource: Send + Sync {
    /// Fetches the tiers of `item`, cheapest first.
    ///
    /// # Errors
    ///
    /// Any failure; the collector decides whether to retry via
    /// [`MarketError::is_retryable`].
    fn fetch(&self, item: ItemId) -> MarketResult<Vec<PriceTier>>;
}

/// Reads saved order histogram bodies from a directory.
///
/// Item `175977920` is read from `<dir>/175977920.json`.
#[derive(Clone, Debug)]
pub struct SnapshotDirSource {
    dir: PathBuf,
}

impl SnapshotDirSource {
    /// Creates a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory being read.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, item: ItemId) -> PathBuf {
        self.dir.join(format!("{item}.json"))
    }
}

impl ListingSource for SnapshotDirSource {
    fn fetch(&self, item: ItemId) -> MarketResult<Vec<PriceTier>> {
        let path = self.path_for(item);
        let body = std::fs::read_to_string(&path)
            .map_err(|e| MarketError::Io(format!("{}: {e}", path.display())))?;
        Ok(parse_sell_order_graph(&body)?)
    }
}
