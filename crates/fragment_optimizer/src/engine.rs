//! # Allocation Engine
//!
//! **Greedy cheapest-per-fragment buying**
//!
//! Repeatedly buys from the candidate with the lowest `unit_price /
//! fragment_yield` until the fragment target is met or every candidate is
//! retired.
//!
//! ## Guarantees
//!
//! 1. **Stable ties**: equal ratios are served in discovery order
//! 2. **Whole units**: the last purchase may overshoot the target, never a
//!    fractional unit
//! 3. **Supply conservation**: a candidate never sells more than its tier
//! 4. **Exhaustion is not an error**: the result just falls short
//!
//! ## Selection structure
//!
//! Candidates sit in a min-heap keyed by (ratio, discovery index). Only the
//! candidate just bought from changes, and its ratio does not, so it is pushed
//! back unchanged when it still has supply. Ratios are compared exactly by
//! cross-multiplication; nothing is ever divided.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::trace;

use crate::catalog::ItemId;
use crate::error::{OptimizerError, OptimizerResult};
use crate::fixed_point::{cmp_per_fragment, Price};
use crate::pool::CandidatePool;

/// One purchase from one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseEvent {
    /// Discovery index of the candidate bought from.
    pub candidate: usize,
    /// Catalog id of the item.
    pub item_id: ItemId,
    /// Display name of the item.
    pub name: String,
    /// Units bought.
    pub units: u64,
    /// Fragments those units produce.
    pub fragments: u64,
    /// Money spent.
    pub spent: Price,
}

/// Everything one engine run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Purchases in the order they were made.
    pub events: Vec<PurchaseEvent>,
    /// Running total of money spent.
    pub total_spent: Price,
    /// Running total of fragments produced.
    pub total_fragments: u64,
    /// The fragment target requested.
    pub target: u64,
}

impl Allocation {
    /// Returns true if liquidity ran out before the target was met.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.total_fragments < self.target
    }

    /// Fragments still missing (zero unless partial).
    #[must_use]
    pub const fn shortfall(&self) -> u64 {
        self.target.saturating_sub(self.total_fragments)
    }
}

/// Heap key: cheapest ratio first, then earliest discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rank {
    unit_price: Price,
    fragment_yield: u32,
    index: usize,
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_per_fragment(
            self.unit_price,
            self.fragment_yield,
            other.unit_price,
            other.fragment_yield,
        )
        .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Buys fragments from `pool` until `target` is reached or supply runs out.
///
/// The pool is consumed in place: afterwards each candidate's remaining
/// supply reflects what was bought.
///
/// # Errors
///
/// - `InvalidTarget` if `target` is zero
/// - `InvalidFragmentYield` if a candidate has a zero yield
/// - `ArithmeticOverflow` if a fragment or money total does not fit
pub fn allocate(pool: &mut CandidatePool, target: u64) -> OptimizerResult<Allocation> {
    if target == 0 {
        return Err(OptimizerError::InvalidTarget(target));
    }
    if let Some(bad) = pool.candidates().iter().find(|c| c.fragment_yield == 0) {
        return Err(OptimizerError::InvalidFragmentYield {
            item_id: bad.item_id,
        });
    }

    let mut heap: BinaryHeap<Reverse<Rank>> = pool
        .candidates()
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_retired())
        .map(|(index, c)| {
            Reverse(Rank {
                unit_price: c.unit_price,
                fragment_yield: c.fragment_yield,
                index,
            })
        })
        .collect();

    let mut events = Vec::new();
    let mut total_spent = Price::ZERO;
    let mut total_fragments: u64 = 0;

    while total_fragments < target {
        let Some(Reverse(rank)) = heap.pop() else {
            break;
        };
        let Some(candidate) = pool.get_mut(rank.index) else {
            continue;
        };

        let need = target - total_fragments;
        let per_unit = u64::from(candidate.fragment_yield);
        let supply = candidate.remaining_supply();
        let max_fragments = u128::from(per_unit) * u128::from(supply);

        let units = if max_fragments <= u128::from(need) {
            supply
        } else {
            need.div_ceil(per_unit)
        };

        let fragments = per_unit
            .checked_mul(units)
            .ok_or(OptimizerError::ArithmeticOverflow)?;
        let spent = candidate.unit_price.safe_mul_int(units)?;
        total_fragments = total_fragments
            .checked_add(fragments)
            .ok_or(OptimizerError::ArithmeticOverflow)?;
        total_spent = total_spent.safe_add(spent)?;
        candidate.take(units);

        trace!(
            candidate = rank.index,
            item = %candidate.name,
            units,
            fragments,
            spent = %spent,
            "purchase"
        );

        events.push(PurchaseEvent {
            candidate: rank.index,
            item_id: candidate.item_id,
            name: candidate.name.clone(),
            units,
            fragments,
            spent,
        });

        if !candidate.is_retired() {
            heap.push(Reverse(rank));
        }
    }

    Ok(Allocation {
        events,
        total_spent,
        total_fragments,
        target,
    })
}
