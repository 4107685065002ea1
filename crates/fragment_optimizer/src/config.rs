//! # Optimizer Configuration
//!
//! Loaded once at startup from the `[optimizer]` table of a TOML file.
//!
//! ```toml
//! [optimizer]
//! price_ceiling = 10
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, OptimizerResult};
use crate::fixed_point::Price;

/// Tiers priced above this are never bought.
pub const DEFAULT_PRICE_CEILING: Price = Price::from_whole(10);

/// Tunables for one optimizer instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Highest unit price the pool builder will accept.
    pub price_ceiling: Price,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            price_ceiling: DEFAULT_PRICE_CEILING,
        }
    }
}

impl OptimizerConfig {
    /// Sets the price ceiling.
    #[must_use]
    pub const fn with_price_ceiling(mut self, ceiling: Price) -> Self {
        self.price_ceiling = ceiling;
        self
    }

    /// Rejects values that would make every run empty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the price ceiling is zero.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.price_ceiling.is_zero() {
            return Err(OptimizerError::InvalidConfig(
                "price_ceiling must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a bare `OptimizerConfig` table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> OptimizerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| OptimizerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
