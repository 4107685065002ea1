//! # Market Error Types

use fragment_optimizer::{ItemId, OptimizerError};
use thiserror::Error;

/// Errors raised while fetching listings or loading planner config.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// The market answered with a non-success status.
    #[error("item {item_id}: market returned HTTP {status}")]
    Http {
        /// Item being fetched.
        item_id: ItemId,
        /// HTTP status code.
        status: u16,
    },

    /// The request never produced a response (connect, timeout, body read).
    #[error("item {item_id}: request failed: {reason}")]
    Transport {
        /// Item being fetched.
        item_id: ItemId,
        /// Underlying failure.
        reason: String,
    },

    /// A local file could not be read.
    #[error("io error: {0}")]
    Io(String),

    /// The listing body or config was rejected by the optimizer crate.
    #[error(transparent)]
    Listing(#[from] OptimizerError),

    /// The binary was built without the requested capability.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl MarketError {
    /// Returns true for failures worth another attempt: gateway errors
    /// (502, 503, 504) and transport failures.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(*status, 502..=504),
            Self::Transport { .. } => true,
            Self::Io(_) | Self::Listing(_) | Self::Unsupported(_) => false,
        }
    }
}

/// Result type for market operations.
pub type MarketResult<T> = Result<T, MarketError>;
