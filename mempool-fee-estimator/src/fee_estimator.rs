use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    block_context::BlockContext,
    config::EstimatorConfig,
    error::{EstimatorError, Result},
    fee_estimate::{Confidence, EstimateSource, FeeEstimate, FeeEstimateGroup, TimedFeeEstimate},
    fee_rate::FeeRate,
    internal::{congestion_pressure, CongestionCurve, SampleStats},
    ledger::FeeLedger,
    mempool_info::FeeMempoolInfo,
};

/// The main entry point for calculating fee-per-cost estimates.
///
/// FeeEstimator combines the fee rates of recently included items with the
/// current mempool occupancy to recommend a rate for inclusion within a
/// target number of blocks. It holds only policy; the ledger, block context
/// and snapshot are passed in on every call.
///
/// # Example
/// ```
/// use mempool_fee_estimator::{
///     BlockContext, Confidence, FeeEstimator, FeeLedger, FeeMempoolInfo, FeeMempoolItem, FeeRate,
/// };
/// use chrono::Utc;
///
/// let estimator = FeeEstimator::new();
/// let ledger = FeeLedger::new();
/// let block = BlockContext::new(1_000);
///
/// for (height, rate) in [(998, 4), (999, 6), (999, 8), (1_000, 10), (1_000, 20)] {
///     ledger.append(FeeMempoolItem::new(height, FeeRate::new(rate))).unwrap();
/// }
///
/// let now = Utc::now();
/// let mempool = FeeMempoolInfo::new(1_000_000, FeeRate::new(5), 900_000, now, 11_000_000).unwrap();
///
/// let estimate = estimator.estimate_fee(2, &mempool, &ledger, &block, now).unwrap();
/// assert!(estimate.fee_rate >= FeeRate::new(10));
/// assert_eq!(estimate.confidence, Confidence::Medium);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeeEstimator {
    config: EstimatorConfig,
}

impl FeeEstimator {
    /// Creates a new FeeEstimator with default settings.
    ///
    /// Default settings:
    /// - 80th percentile of samples from the last 2·H blocks
    /// - Congestion threshold 0.5 with a 50% surge at a full mempool
    /// - Medium confidence from 3 samples, high from 20
    /// - Snapshots older than 5 minutes are low confidence
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new FeeEstimator with custom settings.
    ///
    /// # Errors
    /// `InvalidConfig` if any parameter is out of range.
    pub fn with_config(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the policy parameters.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimates the fee rate needed for inclusion within `target_blocks` blocks.
    ///
    /// When the ledger has no samples in the window the replacement floor of
    /// `mempool` is returned with low confidence rather than an error.
    ///
    /// # Arguments
    /// * `target_blocks` - Inclusion horizon in blocks, at least 1
    /// * `mempool` - The current mempool snapshot
    /// * `ledger` - Fee rates of recently included items
    /// * `block` - The current chain height
    /// * `now` - Wall-clock time used to judge snapshot staleness
    ///
    /// # Errors
    /// `InvalidHorizon` if `target_blocks` is zero.
    pub fn estimate_fee(
        &self,
        target_blocks: u32,
        mempool: &FeeMempoolInfo,
        ledger: &FeeLedger,
        block: &BlockContext,
        now: DateTime<Utc>,
    ) -> Result<FeeEstimate> {
        self.estimate(target_blocks, mempool, ledger, block, now, false)
    }

    /// Like [`estimate_fee`](Self::estimate_fee), but fails with
    /// `InsufficientData` instead of falling back to the replacement floor.
    pub fn estimate_fee_strict(
        &self,
        target_blocks: u32,
        mempool: &FeeMempoolInfo,
        ledger: &FeeLedger,
        block: &BlockContext,
        now: DateTime<Utc>,
    ) -> Result<FeeEstimate> {
        self.estimate(target_blocks, mempool, ledger, block, now, true)
    }

    /// Estimates the fee rate needed for inclusion within `target_seconds`.
    ///
    /// The time target is converted to blocks with the configured average
    /// block interval, rounding up.
    pub fn estimate_fee_for_time(
        &self,
        target_seconds: u64,
        mempool: &FeeMempoolInfo,
        ledger: &FeeLedger,
        block: &BlockContext,
        now: DateTime<Utc>,
    ) -> Result<FeeEstimate> {
        let target_blocks = self.blocks_for_time(target_seconds);
        self.estimate_fee(target_blocks, mempool, ledger, block, now)
    }

    /// Estimates fee rates for several time targets against the same inputs.
    ///
    /// Every time target maps to a horizon of at least one block, so each
    /// entry carries an estimate. An entry's `error` is only set when a
    /// target fails, which leaves the other entries untouched; callers use
    /// it for failures found after estimation, such as a total fee that
    /// overflows.
    pub fn estimate_fees(
        &self,
        time_targets: &[u64],
        mempool: &FeeMempoolInfo,
        ledger: &FeeLedger,
        block: &BlockContext,
        now: DateTime<Utc>,
    ) -> FeeEstimateGroup {
        let estimates = time_targets
            .iter()
            .map(|&time_target| {
                match self.estimate_fee_for_time(time_target, mempool, ledger, block, now) {
                    Ok(estimate) => TimedFeeEstimate {
                        time_target,
                        estimate: Some(estimate),
                        error: None,
                    },
                    Err(err) => TimedFeeEstimate {
                        time_target,
                        estimate: None,
                        error: Some(err.to_string()),
                    },
                }
            })
            .collect();

        FeeEstimateGroup { estimates }
    }

    /// Converts a time target in seconds to a block horizon, rounding up.
    ///
    /// Any target, including zero seconds, needs at least the next block.
    pub fn blocks_for_time(&self, target_seconds: u64) -> u32 {
        let blocks = target_seconds.div_ceil(self.config.seconds_per_block).max(1);
        u32::try_from(blocks).unwrap_or(u32::MAX)
    }

    fn estimate(
        &self,
        target_blocks: u32,
        mempool: &FeeMempoolInfo,
        ledger: &FeeLedger,
        block: &BlockContext,
        now: DateTime<Utc>,
        strict: bool,
    ) -> Result<FeeEstimate> {
        if target_blocks == 0 {
            return Err(EstimatorError::invalid_horizon(
                "target must be at least 1 block",
            ));
        }

        let window = target_blocks.saturating_mul(self.config.smoothing_multiplier);
        let samples: Vec<FeeRate> = ledger.query(window, block.height()).collect();
        let floor = mempool.minimum_fee_per_cost_to_replace();
        let stale = mempool.is_stale(now, self.config.staleness());

        let Some(stats) = SampleStats::from_rates(&samples, self.config.percentile) else {
            if strict {
                return Err(EstimatorError::insufficient_data(format!(
                    "no included items within {window} blocks of height {}",
                    block.height()
                )));
            }

            debug!(
                target_blocks,
                window,
                floor = floor.to_subunit_per_cost(),
                "No ledger samples, falling back to replace floor"
            );
            return Ok(FeeEstimate {
                fee_rate: floor,
                confidence: Confidence::Low,
                target_blocks,
                sample_count: 0,
                source: EstimateSource::ReplaceFloor,
                mempool_time: mempool.time(),
            });
        };

        let pressure = congestion_pressure(mempool, target_blocks);
        let curve = CongestionCurve::new(
            self.config.congestion_threshold,
            self.config.congestion_surge,
        );
        let biased = curve.apply(&stats, pressure);

        // Round toward zero; the cast saturates for out of range values
        let biased = FeeRate::new(biased.floor() as u64);
        let ceiling = stats
            .ceiling(self.config.outlier_multiplier)
            .min(self.config.max_fee_rate);
        let fee_rate = biased.min(ceiling).max(floor);

        let confidence = self.confidence(stats.count, stale);

        debug!(
            target_blocks,
            samples = stats.count,
            pressure,
            base = stats.base,
            ceiling = ceiling.to_subunit_per_cost(),
            fee_rate = fee_rate.to_subunit_per_cost(),
            %confidence,
            "Calculated fee estimate"
        );

        Ok(FeeEstimate {
            fee_rate,
            confidence,
            target_blocks,
            sample_count: stats.count,
            source: EstimateSource::History,
            mempool_time: mempool.time(),
        })
    }

    /// Grades an estimate by sample count; a stale snapshot is always low.
    fn confidence(&self, sample_count: usize, stale: bool) -> Confidence {
        if stale {
            Confidence::Low
        } else if sample_count >= self.config.high_confidence_samples {
            Confidence::High
        } else if sample_count >= self.config.medium_confidence_samples {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}
