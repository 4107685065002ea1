//! # Candidate Pool
//!
//! Flattens every item's affordable price tiers into one indexed arena of
//! purchasable candidates.
//!
//! A candidate's index is its discovery order: items are visited in catalog
//! order and tiers in listing order. The allocation engine breaks cost ties on
//! this index, so the same catalog and snapshot always produce the same pool.

use tracing::debug;

use crate::catalog::{ItemCatalog, ItemId};
use crate::error::{OptimizerError, OptimizerResult};
use crate::fixed_point::Price;
use crate::listing::ListingSnapshot;

/// One (item, price tier) pairing with mutable remaining supply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Catalog id of the item.
    pub item_id: ItemId,
    /// Display name of the item.
    pub name: String,
    /// Fragments per unit. Always positive.
    pub fragment_yield: u32,
    /// Price per unit.
    pub unit_price: Price,
    /// Units offered by the tier.
    original_supply: u64,
    /// Units not yet bought.
    remaining_supply: u64,
}

impl Candidate {
    /// Creates a candidate with its full tier quantity available.
    #[must_use]
    pub fn new(
        item_id: ItemId,
        name: impl Into<String>,
        fragment_yield: u32,
        unit_price: Price,
        supply: u64,
    ) -> Self {
        Self {
            item_id,
            name: name.into(),
            fragment_yield,
            unit_price,
            original_supply: supply,
            remaining_supply: supply,
        }
    }

    /// Units offered by the tier before any purchase.
    #[inline]
    #[must_use]
    pub const fn original_supply(&self) -> u64 {
        self.original_supply
    }

    /// Units still available.
    #[inline]
    #[must_use]
    pub const fn remaining_supply(&self) -> u64 {
        self.remaining_supply
    }

    /// A candidate with no supply left is never selected again.
    #[inline]
    #[must_use]
    pub const fn is_retired(&self) -> bool {
        self.remaining_supply == 0
    }

    /// Removes `units` from the remaining supply.
    ///
    /// Never takes supply below zero.
    pub(crate) fn take(&mut self, units: u64) {
        debug_assert!(units <= self.remaining_supply);
        self.remaining_supply = self.remaining_supply.saturating_sub(units);
    }
}

/// The candidates for one allocation run, indexed by discovery order.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Builds the pool from the catalog and a listing snapshot.
    ///
    /// Tiers are assumed sorted by non-decreasing price, so the first tier
    /// above `price_ceiling` ends that item. Listed items missing from the
    /// catalog are ignored; catalog items without a listing contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFragmentYield` if a listed catalog item has a zero yield.
    pub fn build(
        catalog: &ItemCatalog,
        listings: &ListingSnapshot,
        price_ceiling: Price,
    ) -> OptimizerResult<Self> {
        for id in listings.item_ids().filter(|&id| !catalog.contains(id)) {
            debug!(item_id = id, "ignoring listing for item outside the catalog");
        }

        let mut candidates = Vec::new();
        for item in catalog.iter() {
            let Some(tiers) = listings.get(item.id) else {
                continue;
            };
            if item.fragment_yield == 0 {
                return Err(OptimizerError::InvalidFragmentYield { item_id: item.id });
            }

            let before = candidates.len();
            for tier in tiers {
                if tier.price > price_ceiling {
                    break;
                }
                candidates.push(Candidate::new(
                    item.id,
                    item.name.clone(),
                    item.fragment_yield,
                    tier.price,
                    tier.quantity,
                ));
            }
            debug!(
                item_id = item.id,
                listed = tiers.len(),
                accepted = candidates.len() - before,
                "pooled item tiers"
            );
        }

        Ok(Self { candidates })
    }

    /// Wraps already-built candidates; their order is their discovery order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFragmentYield` if any candidate has a zero yield.
    pub fn from_candidates(candidates: Vec<Candidate>) -> OptimizerResult<Self> {
        if let Some(bad) = candidates.iter().find(|c| c.fragment_yield == 0) {
            return Err(OptimizerError::InvalidFragmentYield {
                item_id: bad.item_id,
            });
        }
        Ok(Self { candidates })
    }

    /// All candidates in discovery order.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidate at a discovery index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Candidate> {
        self.candidates.get_mut(index)
    }

    /// Number of candidates, retired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if the pool has no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns true if every candidate is retired.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.candidates.iter().all(Candidate::is_retired)
    }

    /// Total fragments obtainable from the remaining supply.
    #[must_use]
    pub fn available_fragments(&self) -> u128 {
        self.candidates
            .iter()
            .map(|c| u128::from(c.fragment_yield) * u128::from(c.remaining_supply))
            .sum()
    }
}
