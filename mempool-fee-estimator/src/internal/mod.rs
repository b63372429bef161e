/// Internal modules for the mempool-fee-estimator library.
/// These are implementation details and should not be used directly by library consumers.
pub(crate) mod congestion;
pub(crate) mod sample_stats;

// Re-export for internal use only
pub(crate) use congestion::{congestion_pressure, CongestionCurve};
pub(crate) use sample_stats::SampleStats;
