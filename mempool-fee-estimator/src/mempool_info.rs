use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EstimatorError, Result};
use crate::fee_rate::FeeRate;

/// A point-in-time record of mempool occupancy and the replacement floor.
///
/// Snapshots are produced by the mempool on every sampling tick and are never
/// mutated; the next tick supersedes them. `time` is the local wall-clock
/// capture time, not block time, and only drives staleness checks.
///
/// # Example
/// ```
/// use mempool_fee_estimator::{FeeMempoolInfo, FeeRate};
/// use chrono::Utc;
///
/// let info = FeeMempoolInfo::new(
///     1_000_000,          // max_size_in_cost
///     FeeRate::new(5),    // minimum_fee_per_cost_to_replace
///     900_000,            // current_mempool_cost
///     Utc::now(),
///     11_000_000,         // max_block_cost
/// ).unwrap();
///
/// assert_eq!(info.headroom_cost(), 100_000);
/// assert!((info.occupancy_ratio() - 0.9).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeeMempoolInfo")]
pub struct FeeMempoolInfo {
    max_size_in_cost: u64,
    minimum_fee_per_cost_to_replace: FeeRate,
    current_mempool_cost: u64,
    time: DateTime<Utc>,
    max_block_cost: u64,
}

/// Unvalidated wire form, checked through [`FeeMempoolInfo::new`] on deserialization.
#[derive(Deserialize)]
struct RawFeeMempoolInfo {
    max_size_in_cost: u64,
    minimum_fee_per_cost_to_replace: FeeRate,
    current_mempool_cost: u64,
    time: DateTime<Utc>,
    max_block_cost: u64,
}

impl TryFrom<RawFeeMempoolInfo> for FeeMempoolInfo {
    type Error = EstimatorError;

    fn try_from(raw: RawFeeMempoolInfo) -> Result<Self> {
        Self::new(
            raw.max_size_in_cost,
            raw.minimum_fee_per_cost_to_replace,
            raw.current_mempool_cost,
            raw.time,
            raw.max_block_cost,
        )
    }
}

impl FeeMempoolInfo {
    /// Creates a validated mempool snapshot.
    ///
    /// # Errors
    /// `InvariantViolation` if the current cost exceeds the capacity, or if
    /// the capacity or the block cost limit is zero.
    pub fn new(
        max_size_in_cost: u64,
        minimum_fee_per_cost_to_replace: FeeRate,
        current_mempool_cost: u64,
        time: DateTime<Utc>,
        max_block_cost: u64,
    ) -> Result<Self> {
        if max_size_in_cost == 0 {
            return Err(EstimatorError::invariant_violation(
                "max_size_in_cost must be non-zero",
            ));
        }
        if max_block_cost == 0 {
            return Err(EstimatorError::invariant_violation(
                "max_block_cost must be non-zero",
            ));
        }
        if current_mempool_cost > max_size_in_cost {
            return Err(EstimatorError::invariant_violation(format!(
                "current_mempool_cost {current_mempool_cost} exceeds max_size_in_cost {max_size_in_cost}"
            )));
        }

        Ok(Self {
            max_size_in_cost,
            minimum_fee_per_cost_to_replace,
            current_mempool_cost,
            time,
            max_block_cost,
        })
    }

    /// Total cost capacity of the mempool.
    pub fn max_size_in_cost(&self) -> u64 {
        self.max_size_in_cost
    }

    /// Fee rate below which a new item cannot displace an existing one.
    pub fn minimum_fee_per_cost_to_replace(&self) -> FeeRate {
        self.minimum_fee_per_cost_to_replace
    }

    /// Sum of the costs of all items currently held.
    pub fn current_mempool_cost(&self) -> u64 {
        self.current_mempool_cost
    }

    /// Local time this sample was taken.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Maximum cost a single block may carry.
    pub fn max_block_cost(&self) -> u64 {
        self.max_block_cost
    }

    /// Fraction of the mempool capacity in use, in `[0, 1]`.
    pub fn occupancy_ratio(&self) -> f64 {
        self.current_mempool_cost as f64 / self.max_size_in_cost as f64
    }

    /// Free capacity in cost units.
    pub fn headroom_cost(&self) -> u64 {
        self.max_size_in_cost - self.current_mempool_cost
    }

    /// Number of full blocks needed to clear the current backlog.
    pub fn backlog_blocks(&self) -> f64 {
        self.current_mempool_cost as f64 / self.max_block_cost as f64
    }

    /// Time elapsed between the capture and `now`. Negative if `now` precedes the capture.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.time
    }

    /// Returns true if the snapshot is older than `threshold` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.age(now) > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(max: u64, current: u64) -> Result<FeeMempoolInfo> {
        FeeMempoolInfo::new(max, FeeRate::new(5), current, Utc::now(), 11_000_000)
    }

    #[test]
    fn test_valid_snapshot() {
        let snapshot = info(1_000_000, 250_000).unwrap();
        assert_eq!(snapshot.max_size_in_cost(), 1_000_000);
        assert_eq!(snapshot.current_mempool_cost(), 250_000);
        assert_eq!(snapshot.minimum_fee_per_cost_to_replace(), FeeRate::new(5));
        assert_eq!(snapshot.headroom_cost(), 750_000);
        assert_eq!(snapshot.occupancy_ratio(), 0.25);
    }

    #[test]
    fn test_full_and_empty() {
        assert_eq!(info(1_000, 1_000).unwrap().occupancy_ratio(), 1.0);
        assert_eq!(info(1_000, 1_000).unwrap().headroom_cost(), 0);
        assert_eq!(info(1_000, 0).unwrap().occupancy_ratio(), 0.0);
    }

    #[test]
    fn test_current_exceeds_max() {
        let result = info(1_000, 1_001);
        assert!(matches!(
            result,
            Err(EstimatorError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            info(0, 0),
            Err(EstimatorError::InvariantViolation(_))
        ));
        assert!(matches!(
            FeeMempoolInfo::new(10, FeeRate::ZERO, 0, Utc::now(), 0),
            Err(EstimatorError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_backlog_blocks() {
        let snapshot =
            FeeMempoolInfo::new(100_000, FeeRate::ZERO, 30_000, Utc::now(), 10_000).unwrap();
        assert_eq!(snapshot.backlog_blocks(), 3.0);
    }

    #[test]
    fn test_staleness() {
        let captured = Utc::now();
        let snapshot =
            FeeMempoolInfo::new(1_000, FeeRate::ZERO, 0, captured, 100).unwrap();

        let threshold = Duration::minutes(5);
        assert!(!snapshot.is_stale(captured + Duration::minutes(4), threshold));
        assert!(snapshot.is_stale(captured + Duration::minutes(6), threshold));
        assert_eq!(snapshot.age(captured + Duration::seconds(30)), Duration::seconds(30));
    }
}
