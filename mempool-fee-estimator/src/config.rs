use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{EstimatorError, Result};
use crate::fee_rate::FeeRate;

/// Policy parameters of the estimator.
///
/// Every field has a default, so a partial configuration file only needs to
/// name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Quantile of sampled fee rates used as the base statistic (0.0 to 1.0)
    pub percentile: f64,

    /// The ledger window is `smoothing_multiplier` times the target horizon
    pub smoothing_multiplier: u32,

    /// Congestion pressure at which the estimate equals the base statistic
    pub congestion_threshold: f64,

    /// Extra fraction of the base statistic added at full congestion
    pub congestion_surge: f64,

    /// Minimum sample count for medium confidence
    pub medium_confidence_samples: usize,

    /// Minimum sample count for high confidence
    pub high_confidence_samples: usize,

    /// Snapshot age, in seconds, beyond which estimates are low confidence
    pub staleness_secs: u64,

    /// Ceiling on any recommended rate, as a multiple of the sample median
    /// (at least 1.0). Keeps a single extreme record from setting the estimate.
    pub outlier_multiplier: f64,

    /// Absolute ceiling on any recommended rate
    pub max_fee_rate: FeeRate,

    /// Average seconds between transaction blocks, for time-based targets
    pub seconds_per_block: u64,
}

impl EstimatorConfig {
    /// Default quantile of sampled fee rates.
    pub const DEFAULT_PERCENTILE: f64 = 0.8;

    /// Default ledger window multiplier.
    pub const DEFAULT_SMOOTHING_MULTIPLIER: u32 = 2;

    /// Default ceiling relative to the sample median.
    pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 2.0;

    /// Default sanity ceiling in mojos per cost.
    pub const DEFAULT_MAX_FEE_RATE: FeeRate = FeeRate::new(10_000_000);

    /// Default average transaction block interval in seconds.
    pub const DEFAULT_SECONDS_PER_BLOCK: u64 = 52;

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.percentile) {
            return Err(EstimatorError::invalid_config(
                "percentile must be between 0.0 and 1.0",
            ));
        }
        if self.smoothing_multiplier == 0 {
            return Err(EstimatorError::invalid_config(
                "smoothing_multiplier must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.congestion_threshold) {
            return Err(EstimatorError::invalid_config(
                "congestion_threshold must be in [0.0, 1.0)",
            ));
        }
        if !self.congestion_surge.is_finite() || self.congestion_surge < 0.0 {
            return Err(EstimatorError::invalid_config(
                "congestion_surge must be a non-negative number",
            ));
        }
        if self.medium_confidence_samples == 0 {
            return Err(EstimatorError::invalid_config(
                "medium_confidence_samples must be positive",
            ));
        }
        if self.medium_confidence_samples > self.high_confidence_samples {
            return Err(EstimatorError::invalid_config(
                "medium_confidence_samples must not exceed high_confidence_samples",
            ));
        }
        if !self.outlier_multiplier.is_finite() || self.outlier_multiplier < 1.0 {
            return Err(EstimatorError::invalid_config(
                "outlier_multiplier must be a number of at least 1.0",
            ));
        }
        if self.seconds_per_block == 0 {
            return Err(EstimatorError::invalid_config(
                "seconds_per_block must be positive",
            ));
        }
        Ok(())
    }

    /// Snapshot age beyond which confidence drops to low.
    pub fn staleness(&self) -> Duration {
        i64::try_from(self.staleness_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            percentile: Self::DEFAULT_PERCENTILE,
            smoothing_multiplier: Self::DEFAULT_SMOOTHING_MULTIPLIER,
            congestion_threshold: 0.5,
            congestion_surge: 0.5,
            medium_confidence_samples: 3,
            high_confidence_samples: 20,
            staleness_secs: 300,
            outlier_multiplier: Self::DEFAULT_OUTLIER_MULTIPLIER,
            max_fee_rate: Self::DEFAULT_MAX_FEE_RATE,
            seconds_per_block: Self::DEFAULT_SECONDS_PER_BLOCK,
        }
    }
}
