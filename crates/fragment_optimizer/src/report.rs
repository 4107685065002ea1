//! # Allocation Report
//!
//! Folds an engine run into per-item subtotals, sorted by item name.
//!
//! The serialized form is the response body clients already consume:
//!
//! ```text
//! { "purchase_details": [ { "name", "buy_count", "decompose_count", "total_price" } ],
//!   "total_amount": 12.5,
//!   "total_decompose_count": 640,
//!   "target": 600 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::{Allocation, PurchaseEvent};
use crate::fixed_point::Price;

/// Purchases of one item summed across tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBreakdown {
    /// Display name of the item.
    pub name: String,
    /// Units bought.
    #[serde(rename = "buy_count")]
    pub units: u64,
    /// Fragments produced.
    #[serde(rename = "decompose_count")]
    pub fragments: u64,
    /// Money spent.
    #[serde(rename = "total_price")]
    pub spent: Price,
}

/// Final result of one optimizer run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Per-item subtotals in ascending name order.
    #[serde(rename = "purchase_details")]
    pub items: Vec<ItemBreakdown>,
    /// Total money spent.
    #[serde(rename = "total_amount")]
    pub total_spent: Price,
    /// Total fragments produced.
    #[serde(rename = "total_decompose_count")]
    pub total_fragments: u64,
    /// The fragment target requested.
    pub target: u64,
}

impl AllocationReport {
    /// Groups purchase events by item name.
    ///
    /// Names are compared bytewise. Totals are the sums across groups.
    /// Counts and amounts saturate instead of overflowing.
    #[must_use]
    pub fn aggregate(events: &[PurchaseEvent], target: u64) -> Self {
        let mut groups: BTreeMap<&str, ItemBreakdown> = BTreeMap::new();

        for event in events {
            let entry = groups
                .entry(event.name.as_str())
                .or_insert_with(|| ItemBreakdown {
                    name: event.name.clone(),
                    units: 0,
                    fragments: 0,
                    spent: Price::ZERO,
                });
            entry.units = entry.units.saturating_add(event.units);
            entry.fragments = entry.fragments.saturating_add(event.fragments);
            entry.spent += event.spent;
        }

        let items: Vec<ItemBreakdown> = groups.into_values().collect();
        let total_spent = items.iter().map(|item| item.spent).sum();
        let total_fragments = items
            .iter()
            .fold(0u64, |total, item| total.saturating_add(item.fragments));

        Self {
            items,
            total_spent,
            total_fragments,
            target,
        }
    }

    /// Builds the report for a finished engine run.
    #[must_use]
    pub fn from_allocation(allocation: &Allocation) -> Self {
        let report = Self::aggregate(&allocation.events, allocation.target);
        debug_assert_eq!(report.total_spent, allocation.total_spent);
        debug_assert_eq!(report.total_fragments, allocation.total_fragments);
        report
    }

    /// Returns true if the target was not reached.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.total_fragments < self.target
    }

    /// Fragments still missing (zero unless partial).
    #[must_use]
    pub const fn shortfall(&self) -> u64 {
        self.target.saturating_sub(self.total_fragments)
    }

    /// Subtotal for an item, if anything was bought.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&ItemBreakdown> {
        self.items.iter().find(|item| item.name == name)
    }
}
