//! # Planner Configuration
//!
//! One TOML file configures the whole pipeline. Every table is optional.
//!
//! ```toml
//! [optimizer]
//! price_ceiling = 10
//!
//! [collector]
//! max_workers = 10
//! max_attempts = 3
//! backoff_ms = 1000
//!
//! [http]
//! endpoint = "https://steamcommunity.com/market/itemordershistogram"
//! country = "CN"
//! language = "schinese"
//! currency = 23
//! timeout_ms = 10000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use fragment_optimizer::{OptimizerConfig, OptimizerError};

use crate::collector::CollectorConfig;
use crate::error::{MarketError, MarketResult};

/// Market order histogram endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://steamcommunity.com/market/itemordershistogram";

/// Request parameters for the market's order histogram endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSourceConfig {
    /// Endpoint URL.
    pub endpoint: String,
    /// Market country code.
    pub country: String,
    /// Market language.
    pub language: String,
    /// Market currency id (23 = CNY).
    pub currency: u32,
    /// Per-request timeout (ms).
    pub timeout_ms: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            country: "CN".to_string(),
            language: "schinese".to_string(),
            currency: 23,
            timeout_ms: 10_000,
        }
    }
}

/// Everything the planner binary needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Pool and allocation settings.
    pub optimizer: OptimizerConfig,
    /// Fetch fan-out settings.
    pub collector: CollectorConfig,
    /// Market request settings.
    pub http: HttpSourceConfig,
}

impl PlannerConfig {
    /// Parses and validates a planner config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> MarketResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| OptimizerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a planner config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`PlannerConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> MarketResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MarketError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first bad value.
    pub fn validate(&self) -> MarketResult<()> {
        self.optimizer.validate()?;
        self.collector.validate()?;
        if self.http.timeout_ms == 0 {
            return Err(OptimizerError::InvalidConfig(
                "http.timeout_ms must be greater than zero".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
