use crate::internal::SampleStats;
use crate::mempool_info::FeeMempoolInfo;

/// Measures how congested the mempool is for a given inclusion target, in `[0, 1]`.
///
/// Takes the larger of the occupancy ratio and the share of the target
/// horizon the current backlog would need to clear. A backlog that takes
/// more blocks than the target counts as full pressure.
pub(crate) fn congestion_pressure(mempool: &FeeMempoolInfo, target_blocks: u32) -> f64 {
    let backlog_share = (mempool.backlog_blocks() / f64::from(target_blocks.max(1))).min(1.0);
    mempool.occupancy_ratio().max(backlog_share).clamp(0.0, 1.0)
}

/// Maps congestion pressure onto a fee rate between the sample minimum and
/// a surge above the base statistic.
///
/// Below the threshold the rate slides linearly from the minimum (no
/// pressure) to the base (pressure at the threshold). Above it the base is
/// scaled by up to `1 + surge` as the remaining headroom disappears. The
/// curve is continuous and never decreases as pressure grows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CongestionCurve {
    threshold: f64,
    surge: f64,
}

impl CongestionCurve {
    pub fn new(threshold: f64, surge: f64) -> Self {
        Self { threshold, surge }
    }

    /// Returns the biased fee rate in mojos per cost, before clamping.
    pub fn apply(&self, stats: &SampleStats, pressure: f64) -> f64 {
        let min = stats.min.to_subunit_per_cost() as f64;
        let base = stats.base;

        if pressure < self.threshold {
            let progress = pressure / self.threshold;
            // min() guards the seam against rounding past the base
            (min + (base - min) * progress).min(base)
        } else {
            let scarcity = (pressure - self.threshold) / (1.0 - self.threshold);
            (base * (1.0 + self.surge * scarcity)).max(base)
        }
    }
}
