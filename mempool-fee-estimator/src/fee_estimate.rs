use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::fee_rate::FeeRate;

/// How much trust a caller can put in an estimate.
///
/// Levels are ordered, so `Confidence::Low < Confidence::High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(label)
    }
}

/// Where the recommended fee rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    /// Derived from fee rates of recently included items
    History,
    /// No history in the window; the mempool replacement floor was used
    ReplaceFloor,
}

/// A recommended fee rate for one inclusion target.
///
/// # Example
/// ```
/// use mempool_fee_estimator::{Confidence, EstimateSource, FeeEstimate, FeeRate};
/// use chrono::Utc;
///
/// let estimate = FeeEstimate {
///     fee_rate: FeeRate::new(12),
///     confidence: Confidence::Medium,
///     target_blocks: 3,
///     sample_count: 8,
///     source: EstimateSource::History,
///     mempool_time: Utc::now(),
/// };
///
/// // Total fee for a spend costing 5_000_000
/// assert_eq!(estimate.fee_for_cost(5_000_000).unwrap(), 60_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimate {
    /// Recommended fee rate
    pub fee_rate: FeeRate,

    /// Trust level of the recommendation
    pub confidence: Confidence,

    /// Inclusion target in blocks
    pub target_blocks: u32,

    /// Number of ledger samples the estimate was derived from
    pub sample_count: usize,

    /// Whether the rate came from history or the replacement floor
    pub source: EstimateSource,

    /// Capture time of the mempool snapshot used
    pub mempool_time: DateTime<Utc>,
}

impl FeeEstimate {
    /// Returns the total fee in mojos for an item of the given cost.
    pub fn fee_for_cost(&self, cost: u64) -> Result<u64> {
        self.fee_rate.fee_for_cost(cost)
    }

    /// Returns true if the estimate was derived from ledger history.
    pub fn has_history(&self) -> bool {
        self.source == EstimateSource::History
    }
}

impl fmt::Display for FeeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} within {} blocks ({} confidence, {} samples)",
            self.fee_rate, self.target_blocks, self.confidence, self.sample_count
        )
    }
}

/// The outcome for one time target in a [`FeeEstimateGroup`].
///
/// Exactly one of `estimate` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedFeeEstimate {
    /// Requested time until inclusion, in seconds
    pub time_target: u64,

    /// The estimate, when one could be produced
    pub estimate: Option<FeeEstimate>,

    /// Why no estimate was produced. Set by callers that reject an estimate
    /// after the fact, for example when its total fee overflows.
    pub error: Option<String>,
}

/// Estimates for several time targets computed from the same inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimateGroup {
    pub estimates: Vec<TimedFeeEstimate>,
}

impl FeeEstimateGroup {
    /// Returns the estimate for a time target, if it was requested and succeeded.
    pub fn get(&self, time_target: u64) -> Option<&FeeEstimate> {
        self.estimates
            .iter()
            .find(|entry| entry.time_target == time_target)
            .and_then(|entry| entry.estimate.as_ref())
    }

    /// Returns true if every requested target produced an estimate.
    pub fn is_complete(&self) -> bool {
        self.estimates.iter().all(|entry| entry.error.is_none())
    }
}

impl fmt::Display for FeeEstimateGroup {
    /// Renders one row per time target.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10}\t{:>20}\t{:>10}", "Seconds", "Fee rate", "Confidence")?;
        for entry in &self.estimates {
            match (&entry.estimate, &entry.error) {
                (Some(estimate), _) => writeln!(
                    f,
                    "{:>10}\t{:>20}\t{:>10}",
                    entry.time_target,
                    estimate.fee_rate.to_string(),
                    estimate.confidence.to_string()
                )?,
                (None, Some(error)) => {
                    writeln!(f, "{:>10}\t{:>20}\t{:>10}", entry.time_target, "-", error)?
                }
                (None, None) => writeln!(f, "{:>10}\t{:>20}\t{:>10}", entry.time_target, "-", "-")?,
            }
        }
        Ok(())
    }
}
