//! # Market Listings
//!
//! Price tiers as delivered by the market, and the per-run snapshot that maps
//! each item to its tiers.
//!
//! The market's order histogram returns a body like:
//!
//! ```text
//! { "success": 1,
//!   "sell_order_graph": [[0.31, 5, "5 at 0.31 or lower"], [0.35, 12, "..."]] }
//! ```
//!
//! Each triple is `(price, quantity, description)`. Quantities are taken
//! literally as the count offered at that tier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::catalog::ItemId;
use crate::error::{OptimizerError, OptimizerResult};
use crate::fixed_point::Price;

/// One price level of an item's sell side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Unit price at this tier.
    pub price: Price,
    /// Units offered at this tier.
    pub quantity: u64,
    /// Opaque market description. Never read by the optimizer.
    #[serde(default)]
    pub label: String,
}

impl PriceTier {
    /// Creates a tier without a description.
    #[must_use]
    pub fn new(price: Price, quantity: u64) -> Self {
        Self {
            price,
            quantity,
            label: String::new(),
        }
    }
}

/// Parses the `sell_order_graph` of an order histogram body.
///
/// A body without a `sell_order_graph` field has no tiers.
///
/// # Errors
///
/// Returns `MalformedListing` if the body is not a JSON object or a row is not
/// a `[price, quantity, ...]` array with a non-negative price and integer
/// quantity.
pub fn parse_sell_order_graph(body: &str) -> OptimizerResult<Vec<PriceTier>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| OptimizerError::MalformedListing(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(OptimizerError::MalformedListing(
            "expected a JSON object".to_string(),
        ));
    };

    let rows = match map.get("sell_order_graph") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(OptimizerError::MalformedListing(format!(
                "sell_order_graph is not an array: {other}"
            )))
        }
    };

    rows.iter().enumerate().map(|(i, row)| parse_row(i, row)).collect()
}

fn parse_row(index: usize, row: &Value) -> OptimizerResult<PriceTier> {
    let malformed = |what: &str| OptimizerError::MalformedListing(format!("row {index}: {what}"));

    let cells = row.as_array().ok_or_else(|| malformed("not an array"))?;
    if cells.len() < 2 {
        return Err(malformed("expected at least price and quantity"));
    }

    let price = cells[0]
        .as_f64()
        .ok_or_else(|| malformed("price is not a number"))
        .and_then(|p| Price::from_f64_rounded(p).map_err(|e| malformed(&e.to_string())))?;
    let quantity = cells[1]
        .as_u64()
        .ok_or_else(|| malformed("quantity is not a non-negative integer"))?;
    let label = match cells.get(2) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(PriceTier {
        price,
        quantity,
        label,
    })
}

/// The listings fetched for one optimizer run.
///
/// Items whose fetch failed are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingSnapshot {
    tiers: HashMap<ItemId, Vec<PriceTier>>,
}

impl ListingSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the tiers for an item, replacing any previous entry.
    pub fn insert(&mut self, item: ItemId, tiers: Vec<PriceTier>) {
        self.tiers.insert(item, tiers);
    }

    /// Tiers for an item, if it was fetched.
    #[must_use]
    pub fn get(&self, item: ItemId) -> Option<&[PriceTier]> {
        self.tiers.get(&item).map(Vec::as_slice)
    }

    /// Returns true if the item was fetched.
    #[must_use]
    pub fn contains(&self, item: ItemId) -> bool {
        self.tiers.contains_key(&item)
    }

    /// Item ids present, in no particular order.
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.tiers.keys().copied()
    }

    /// Number of items present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Returns true if nothing was fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl FromIterator<(ItemId, Vec<PriceTier>)> for ListingSnapshot {
    fn from_iter<I: IntoIterator<Item = (ItemId, Vec<PriceTier>)>>(iter: I) -> Self {
        Self {
            tiers: iter.into_iter().collect(),
        }
    }
}

impl Extend<(ItemId, Vec<PriceTier>)> for ListingSnapshot {
    fn extend<I: IntoIterator<Item = (ItemId, Vec<PriceTier>)>>(&mut self, iter: I) {
        self.tiers.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_histogram_body() {
        let body = r#"{
            "success": 1,
            "sell_order_graph": [
                [0.31, 5, "5 at 0.31 or lower"],
                [1.2, 12, "12 at 1.20 or lower"]
            ],
            "buy_order_graph": []
        }"#;
        let tiers = parse_sell_order_graph(body).unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].price, Price::from_parts(0, 310_000));
        assert_eq!(tiers[0].quantity, 5);
        assert_eq!(tiers[0].label, "5 at 0.31 or lower");
        assert_eq!(tiers[1].price, Price::from_parts(1, 200_000));
        assert_eq!(tiers[1].quantity, 12);
    }

    #[test]
    fn test_missing_graph_is_empty() {
        assert!(parse_sell_order_graph(r#"{"success": 16}"#).unwrap().is_empty());
        assert!(parse_sell_order_graph(r#"{"sell_order_graph": null}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_extra_field_is_optional() {
        let tiers = parse_sell_order_graph(r#"{"sell_order_graph": [[2, 3]]}"#).unwrap();
        assert_eq!(tiers, vec![PriceTier::new(Price::from_whole(2), 3)]);
    }

    #[test]
    fn test_malformed_rows_rejected() {
        for body in [
            "[]",
            "not json",
            r#"{"sell_order_graph": 4}"#,
            r#"{"sell_order_graph": [[1.0]]}"#,
            r#"{"sell_order_graph": [["cheap", 1, ""]]}"#,
            r#"{"sell_order_graph": [[-1.0, 1, ""]]}"#,
            r#"{"sell_order_graph": [[1.0, 2.5, ""]]}"#,
        ] {
            assert!(
                matches!(
                    parse_sell_order_graph(body),
                    Err(OptimizerError::MalformedListing(_))
                ),
                "{body} should be malformed"
            );
        }
    }

    #[test]
    fn test_snapshot_collects() {
        let snapshot: ListingSnapshot = vec![
            (1, vec![PriceTier::new(Price::ONE, 1)]),
            (2, Vec::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(2));
        assert_eq!(snapshot.get(2), Some(&[][..]));
        assert!(snapshot.get(3).is_none());
    }
}
