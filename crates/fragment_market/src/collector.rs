//! # Listing Collector
//!
//! **Bounded fan-out over a listing source**
//!
//! ```text
//!                     ┌──> worker 1 ──┐
//!   [item id queue] ──┼──> worker 2 ──┼──> [result channel] ──> ListingSnapshot
//!                     └──> worker N ──┘
//! ```
//!
//! Workers are scoped threads pulling ids from a shared job channel, so at most
//! `max_workers` requests are in flight. A failed item is retried with
//! exponential backoff while its error is retryable, then dropped: the
//! snapshot is partial, never an error.

use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use fragment_optimizer::{ItemId, ListingSnapshot, OptimizerError, PriceTier};

use crate::error::{MarketError, MarketResult};
use crate::source::ListingSource;

/// Collector tunables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    /// Worker threads, i.e. requests in flight.
    pub max_workers: usize,
    /// Attempts per item, first try included.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry (ms).
    pub backoff_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            max_attempts: 3,
            backoff_ms: 1_000,
        }
    }
}

impl CollectorConfig {
    /// Rejects a collector that could never fetch anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if workers or attempts are zero.
    pub fn validate(&self) -> MarketResult<()> {
        if self.max_workers == 0 {
            return Err(OptimizerError::InvalidConfig(
                "collector.max_workers must be at least 1".to_string(),
            )
            .into());
        }
        if self.max_attempts == 0 {
            return Err(OptimizerError::InvalidConfig(
                "collector.max_attempts must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Delay before attempt `attempt + 1`, given `attempt` failures so far.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// What one collection pass achieved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Items requested.
    pub requested: usize,
    /// Items with listings in the snapshot.
    pub fetched: usize,
    /// Items dropped after their last attempt, with the final error.
    pub failed: BTreeMap<ItemId, MarketError>,
    /// Extra attempts made beyond the first per item.
    pub retries: u64,
    /// Wall-clock time of the pass.
    pub elapsed: Duration,
}

impl CollectionStats {
    /// Returns true if every requested item was fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.fetched == self.requested
    }
}

struct FetchOutcome {
    result: MarketResult<Vec<PriceTier>>,
    attempts: u32,
}

/// Fetches many items' listings with bounded concurrency and retries.
#[derive(Clone, Copy, Debug, Default)]
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    /// Creates a collector.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the config does not validate.
    pub fn new(config: CollectorConfig) -> MarketResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Fetches every item in `items` from `source`.
    ///
    /// Blocks until all workers finish. Items that still fail after their
    /// last attempt are absent from the snapshot and listed in the stats.
    pub fn collect<S>(&self, source: &S, items: &[ItemId]) -> (ListingSnapshot, CollectionStats)
    where
        S: ListingSource + ?Sized,
    {
        let started = Instant::now();
        let (job_tx, job_rx) = unbounded::<ItemId>();
        let (result_tx, result_rx) = unbounded::<(ItemId, FetchOutcome)>();

        for &item in items {
            if job_tx.send(item).is_err() {
                break;
            }
        }
        drop(job_tx);

        let workers = self.config.max_workers.min(items.len());
        thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move || {
                    for item in jobs.iter() {
                        let outcome = self.fetch_with_retry(source, item);
                        if results.send((item, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut snapshot = ListingSnapshot::new();
        let mut stats = CollectionStats {
            requested: items.len(),
            ..CollectionStats::default()
        };
        for (item, outcome) in result_rx.iter() {
            stats.retries += u64::from(outcome.attempts.saturating_sub(1));
            match outcome.result {
                Ok(tiers) => {
                    snapshot.insert(item, tiers);
                    stats.fetched += 1;
                }
                Err(err) => {
                    stats.failed.insert(item, err);
                }
            }
        }
        stats.elapsed = started.elapsed();

        info!(
            requested = stats.requested,
            fetched = stats.fetched,
            failed = stats.failed.len(),
            retries = stats.retries,
            elapsed_ms = u64::try_from(stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            "listing collection finished"
        );

        (snapshot, stats)
    }

    fn fetch_with_retry<S>(&self, source: &S, item: ItemId) -> FetchOutcome
    where
        S: ListingSource + ?Sized,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match source.fetch(item) {
                Ok(tiers) => {
                    return FetchOutcome {
                        result: Ok(tiers),
                        attempts: attempt,
                    }
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.backoff(attempt);
                    warn!(item_id = item, attempt, error = %err, ?delay, "retrying listing fetch");
                    thread::sleep(delay);
                }
                Err(err) => {
                    error!(item_id = item, attempt, error = %err, "listing fetch failed");
                    return FetchOutcome {
                        result: Err(err),
                        attempts: attempt,
                    };
                }
            }
        }
    }
}
