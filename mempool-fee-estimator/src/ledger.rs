use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

use crate::error::{EstimatorError, Result};
use crate::fee_rate::FeeRate;

/// One inclusion fact: the fee rate an item paid and the height of the block
/// that included it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeMempoolItem {
    /// Height of the block that included the item
    pub height_added: u32,

    /// Fee rate the item paid; zero is a valid free inclusion
    pub fee_per_cost: FeeRate,
}

impl FeeMempoolItem {
    /// Creates a new inclusion record.
    pub fn new(height_added: u32, fee_per_cost: FeeRate) -> Self {
        Self {
            height_added,
            fee_per_cost,
        }
    }
}

/// Ledger behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Accept records older than the newest one and slot them into height order
    pub allow_backfill: bool,

    /// Upper bound on the records a single query scans, newest first
    pub max_query_samples: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            allow_backfill: false,
            max_query_samples: 10_000,
        }
    }
}

/// Append-only record of fee rates for included items, ordered by inclusion height.
///
/// A single producer appends while any number of estimators query. The
/// records live in an immutable shared vector that writers replace under a
/// short lock, so a query works on the prefix that existed when it started
/// and never sees a partial append or a prune in progress.
///
/// # Example
/// ```
/// use mempool_fee_estimator::{FeeLedger, FeeMempoolItem, FeeRate};
///
/// let ledger = FeeLedger::new();
/// ledger.append(FeeMempoolItem::new(100, FeeRate::new(4))).unwrap();
/// ledger.append(FeeMempoolItem::new(105, FeeRate::new(9))).unwrap();
///
/// // Only the record from height 105 falls within 3 blocks of height 106
/// let rates: Vec<_> = ledger.query(3, 106).collect();
/// assert_eq!(rates, vec![FeeRate::new(9)]);
/// ```
#[derive(Debug, Default)]
pub struct FeeLedger {
    config: LedgerConfig,
    records: RwLock<Arc<Vec<FeeMempoolItem>>>,
}

impl FeeLedger {
    /// Creates an empty ledger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty ledger with custom settings.
    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        if config.max_query_samples == 0 {
            return Err(EstimatorError::invalid_config(
                "max_query_samples must be positive",
            ));
        }

        Ok(Self {
            config,
            records: RwLock::default(),
        })
    }

    /// Returns the ledger settings.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Appends an inclusion record.
    ///
    /// # Errors
    /// `OutOfOrder` if the record's height is below the newest stored height
    /// and backfill is disabled.
    pub fn append(&self, record: FeeMempoolItem) -> Result<()> {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let newest = guard.last().map(|r| r.height_added);

        match newest {
            Some(newest) if record.height_added < newest => {
                if !self.config.allow_backfill {
                    return Err(EstimatorError::OutOfOrder {
                        height: record.height_added,
                        newest,
                    });
                }

                // Insert after every record at the same or a lower height
                let records = Arc::make_mut(&mut guard);
                let position = records.partition_point(|r| r.height_added <= record.height_added);
                records.insert(position, record);
                trace!(
                    height = record.height_added,
                    newest,
                    "Backfilled ledger record"
                );
            }
            _ => Arc::make_mut(&mut guard).push(record),
        }

        Ok(())
    }

    /// Returns the fee rates of records included at or after
    /// `current_height - horizon_blocks`.
    ///
    /// The returned iterator reads from the ledger as it was when the query
    /// started, yields records in height order and can be consumed once. At
    /// most `max_query_samples` of the most recent matching records are scanned.
    pub fn query(&self, horizon_blocks: u32, current_height: u32) -> LedgerQuery {
        let records = Arc::clone(&self.records.read().unwrap_or_else(PoisonError::into_inner));

        let lowest_height = current_height.saturating_sub(horizon_blocks);
        let end = records.len();
        let start = records
            .partition_point(|r| r.height_added < lowest_height)
            .max(end.saturating_sub(self.config.max_query_samples));

        trace!(
            lowest_height,
            current_height,
            samples = end - start,
            "Ledger query"
        );

        LedgerQuery {
            records,
            next: start,
            end,
        }
    }

    /// Drops records more than `retain_horizon_blocks` below the newest height.
    ///
    /// Queries already in flight keep reading the records they started with.
    /// Returns the number of records removed.
    pub fn prune(&self, retain_horizon_blocks: u32) -> usize {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let Some(newest) = guard.last().map(|r| r.height_added) else {
            return 0;
        };

        let cutoff = newest.saturating_sub(retain_horizon_blocks);
        let stale = guard.partition_point(|r| r.height_added < cutoff);
        if stale == 0 {
            return 0;
        }

        Arc::make_mut(&mut guard).drain(..stale);
        debug!(removed = stale, cutoff, "Pruned ledger records");
        stale
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height of the most recently included record, if any.
    pub fn newest_height(&self) -> Option<u32> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|r| r.height_added)
    }
}

/// A single pass over the fee rates a ledger query matched.
///
/// Not `Clone`: once consumed the sequence is gone, and a fresh query is
/// needed to read the ledger again.
#[derive(Debug)]
pub struct LedgerQuery {
    records: Arc<Vec<FeeMempoolItem>>,
    next: usize,
    end: usize,
}

impl LedgerQuery {
    /// Returns true if no fee rates remain, which for a fresh query means
    /// the ledger had no data within the horizon.
    pub fn is_empty(&self) -> bool {
        self.next >= self.end
    }
}

impl Iterator for LedgerQuery {
    type Item = FeeRate;

    fn next(&mut self) -> Option<FeeRate> {
        if self.next >= self.end {
            return None;
        }
        let rate = self.records[self.next].fee_per_cost;
        self.next += 1;
        Some(rate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LedgerQuery {}
