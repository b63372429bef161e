use chrono::Utc;
use mempool_fee_estimator::{
    BlockContext, EstimatorError, FeeBlockInfo, FeeEstimate, FeeEstimateGroup, FeeEstimator,
    FeeLedger, FeeMempoolInfo, FeeMempoolItem,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// Ledger records this many blocks ahead of the chain height log a warning
/// on every estimate.
pub const BLOCK_LAG_WARNING: u32 = 10;

/// Fee tracker errors
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Estimation error: {0}")]
    EstimationError(#[from] EstimatorError),

    #[error("No mempool snapshot received yet")]
    NoSnapshot,
}

/// Service that ingests mempool and chain events and answers fee estimates.
///
/// The mempool pushes a fresh [`FeeMempoolInfo`] on every sampling tick and
/// one [`FeeMempoolItem`] per included item; the chain pushes one
/// [`FeeBlockInfo`] per confirmed block. Estimates always use the latest
/// snapshot together with the ledger as it stands at the time of the call.
pub struct FeeTracker {
    fee_estimator: FeeEstimator,
    ledger: FeeLedger,
    block: BlockContext,
    latest_info: RwLock<Option<FeeMempoolInfo>>,
}

impl FeeTracker {
    /// Creates a tracker starting at `start_height` with no snapshot yet
    pub fn new(fee_estimator: FeeEstimator, ledger: FeeLedger, start_height: u32) -> Self {
        Self {
            fee_estimator,
            ledger,
            block: BlockContext::new(start_height),
            latest_info: RwLock::new(None),
        }
    }

    /// Replaces the latest mempool snapshot
    pub async fn update_mempool_info(&self, info: FeeMempoolInfo) {
        debug!(
            current_cost = info.current_mempool_cost(),
            occupancy = info.occupancy_ratio(),
            "Mempool snapshot updated"
        );
        *self.latest_info.write().await = Some(info);
    }

    /// Gets the latest mempool snapshot
    pub async fn latest_mempool_info(&self) -> Option<FeeMempoolInfo> {
        self.latest_info.read().await.clone()
    }

    /// Advances the chain height for a newly confirmed block
    pub fn new_block(&self, block: FeeBlockInfo) -> Result<(), TrackerError> {
        self.block.apply(&block)?;
        debug!(height = block.block_height, "New block");
        Ok(())
    }

    /// Records one included item
    pub fn add_included_item(&self, item: FeeMempoolItem) -> Result<(), TrackerError> {
        self.ledger.append(item)?;
        Ok(())
    }

    /// Records included items in order and returns how many were stored.
    ///
    /// Stops at the first rejected item; the items before it stay recorded.
    pub fn add_included_items(&self, items: &[FeeMempoolItem]) -> Result<usize, TrackerError> {
        for (index, item) in items.iter().enumerate() {
            if let Err(err) = self.ledger.append(*item) {
                warn!(index, height = item.height_added, "Rejected included item: {}", err);
                return Err(err.into());
            }
        }
        debug!(count = items.len(), "Recorded included items");
        Ok(items.len())
    }

    /// Calculates the fee estimate for a block horizon
    pub async fn estimate_for_blocks(&self, target_blocks: u32) -> Result<FeeEstimate, TrackerError> {
        let info = self.snapshot().await?;
        self.check_block_lag();
        let estimate = self.fee_estimator.estimate_fee(
            target_blocks,
            &info,
            &self.ledger,
            &self.block,
            Utc::now(),
        )?;
        Ok(estimate)
    }

    /// Calculates fee estimates for several time targets in seconds
    pub async fn estimate_for_times(
        &self,
        time_targets: &[u64],
    ) -> Result<FeeEstimateGroup, TrackerError> {
        let info = self.snapshot().await?;
        self.check_block_lag();
        Ok(self.fee_estimator.estimate_fees(
            time_targets,
            &info,
            &self.ledger,
            &self.block,
            Utc::now(),
        ))
    }

    /// Drops ledger history beyond `retention_blocks` and returns the number removed
    pub fn prune(&self, retention_blocks: u32) -> usize {
        self.ledger.prune(retention_blocks)
    }

    /// Prunes the ledger on a fixed interval, forever
    pub async fn run_pruning(&self, retention_blocks: u32, interval_secs: u64) {
        let mut interval = interval(Duration::from_secs(interval_secs.max(1)));

        info!(
            "Starting ledger pruning every {}s, keeping {} blocks",
            interval_secs, retention_blocks
        );

        loop {
            interval.tick().await;
            let removed = self.prune(retention_blocks);
            if removed > 0 {
                info!("Pruned {} ledger records", removed);
            }
        }
    }

    /// Current chain height
    pub fn block_height(&self) -> u32 {
        self.block.height()
    }

    /// Blocks by which the newest ledger record is ahead of the chain height.
    ///
    /// Estimation windows are measured back from the chain height, so a
    /// large lag (no blocks posted yet, or a stalled block feed) lets the
    /// window take in far more history than the target asks for.
    pub fn block_lag(&self) -> u32 {
        self.ledger
            .newest_height()
            .map_or(0, |newest| newest.saturating_sub(self.block.height()))
    }

    /// Number of included items held in the ledger
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    /// The estimator answering requests
    pub fn estimator(&self) -> &FeeEstimator {
        &self.fee_estimator
    }

    fn check_block_lag(&self) {
        let lag = self.block_lag();
        if lag > BLOCK_LAG_WARNING {
            warn!(
                lag,
                block_height = self.block.height(),
                "Ledger is ahead of the chain height; estimates cover more history than requested"
            );
        }
    }

    async fn snapshot(&self) -> Result<FeeMempoolInfo, TrackerError> {
        self.latest_info
            .read()
            .await
            .clone()
            .ok_or(TrackerError::NoSnapshot)
    }
}

#[cfg(test)]
#[path = "fee_tracker_tests.rs"]
mod tests;
