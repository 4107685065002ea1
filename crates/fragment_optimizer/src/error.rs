//! # Optimizer Error Types
//!
//! All errors that can occur while building or running an allocation.

use thiserror::Error;

use crate::catalog::ItemId;

/// Errors that can occur in the fragment optimizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimizerError {
    /// An item has a zero (or missing) fragment yield.
    #[error("invalid fragment yield for item {item_id}: must be positive")]
    InvalidFragmentYield {
        /// The offending item.
        item_id: ItemId,
    },

    /// The requested fragment target is not positive.
    #[error("invalid fragment target {0}: must be positive")]
    InvalidTarget(u64),

    /// Arithmetic overflow in a price or fragment calculation.
    #[error("arithmetic overflow in allocation calculation")]
    ArithmeticOverflow,

    /// A price could not be parsed or is out of range.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Invalid configuration value or file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The same item id appears twice in a catalog.
    #[error("duplicate item in catalog: {0}")]
    DuplicateItem(ItemId),

    /// A market listing body could not be parsed.
    #[error("malformed listing: {0}")]
    MalformedListing(String),

    /// Reading a configuration or catalog file failed.
    #[error("io error: {0}")]
    Io(String),
}

/// Result type for optimizer operations.
pub type OptimizerResult<T> = Result<T, OptimizerError>;
