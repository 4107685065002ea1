//! # Market HTTP Source
//!
//! Fetches live order histograms. Each request carries the next user agent
//! from a fixed rotation and is bounded by the configured timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;

use fragment_optimizer::{parse_sell_order_graph, ItemId, PriceTier};

use crate::config::HttpSourceConfig;
use crate::error::{MarketError, MarketResult};
use crate::source::ListingSource;

/// User agents rotated across requests.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Live listing source backed by the market's histogram endpoint.
pub struct HttpListingSource {
    client: Client,
    config: HttpSourceConfig,
    next_agent: AtomicUsize,
}

impl HttpListingSource {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the TLS backend cannot be initialized.
    pub fn new(config: HttpSourceConfig) -> MarketResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| MarketError::Transport {
                item_id: 0,
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            config,
            next_agent: AtomicUsize::new(0),
        })
    }

    fn user_agent(&self) -> &'static str {
        let i = self.next_agent.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[i % USER_AGENTS.len()]
    }

    fn query(&self, item: ItemId) -> [(&'static str, String); 5] {
        [
            ("country", self.config.country.clone()),
            ("language", self.config.language.clone()),
            ("currency", self.config.currency.to_string()),
            ("item_nameid", item.to_string()),
            ("two_factor", "0".to_string()),
        ]
    }
}

impl ListingSource for HttpListingSource {
    fn fetch(&self, item: ItemId) -> MarketResult<Vec<PriceTier>> {
        let transport = |e: reqwest::Error| MarketError::Transport {
            item_id: item,
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(&self.config.endpoint)
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .query(&self.query(item)[..])
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::Http {
                item_id: item,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(transport)?;
        Ok(parse_sell_order_graph(&body)?)
    }
}
