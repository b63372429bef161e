use statrs::statistics::{Data, OrderStatistics};

use crate::fee_rate::FeeRate;

/// Order statistics over the fee rates sampled from the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SampleStats {
    pub count: usize,
    pub min: FeeRate,
    pub max: FeeRate,
    /// Interpolated quantile at the requested percentile, in mojos per cost
    pub base: f64,
    pub median: f64,
}

impl SampleStats {
    /// Computes the statistics, or `None` for an empty sample set.
    ///
    /// The quantile uses the median-unbiased interpolation from `statrs`,
    /// so it always lies between the smallest and largest sample.
    pub fn from_rates(rates: &[FeeRate], percentile: f64) -> Option<Self> {
        let min = rates.iter().min().copied()?;
        let max = rates.iter().max().copied()?;

        let values: Vec<f64> = rates
            .iter()
            .map(|rate| rate.to_subunit_per_cost() as f64)
            .collect();
        let (low, high) = (min.to_subunit_per_cost() as f64, max.to_subunit_per_cost() as f64);
        let mut data = Data::new(values);
        let base = data.quantile(percentile).clamp(low, high);
        let median = data.quantile(0.5).clamp(low, high);

        Some(Self {
            count: rates.len(),
            min,
            max,
            base,
            median,
        })
    }

    /// Highest rate the samples support: `multiplier` times the median,
    /// never above the largest sample.
    ///
    /// A single extreme record moves the largest sample and the upper
    /// quantiles, but barely moves the median.
    pub fn ceiling(&self, multiplier: f64) -> FeeRate {
        // The cast saturates for out of range values
        let robust = FeeRate::new((self.median * multiplier).floor() as u64);
        robust.min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(values: &[u64]) -> Vec<FeeRate> {
        values.iter().copied().map(FeeRate::new).collect()
    }

    #[test]
    fn test_empty() {
        assert_eq!(SampleStats::from_rates(&[], 0.8), None);
    }

    #[test]
    fn test_single_sample() {
        let stats = SampleStats::from_rates(&rates(&[7]), 0.8).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, FeeRate::new(7));
        assert_eq!(stats.max, FeeRate::new(7));
        assert_eq!(stats.base, 7.0);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.ceiling(2.0), FeeRate::new(7));
    }

    #[test]
    fn test_quantile_bounds() {
        let samples = rates(&[20, 4, 10, 8, 6]);

        let low = SampleStats::from_rates(&samples, 0.0).unwrap();
        assert_eq!(low.base, 4.0);

        let high = SampleStats::from_rates(&samples, 1.0).unwrap();
        assert_eq!(high.base, 20.0);

        let p80 = SampleStats::from_rates(&samples, 0.8).unwrap();
        assert!(p80.base >= 10.0 && p80.base <= 20.0, "p80 was {}", p80.base);
        assert_eq!(p80.min, FeeRate::new(4));
        assert_eq!(p80.max, FeeRate::new(20));
    }

    #[test]
    fn test_median() {
        assert_eq!(SampleStats::from_rates(&rates(&[9, 1, 5]), 0.8).unwrap().median, 5.0);
        assert_eq!(SampleStats::from_rates(&rates(&[1, 4, 6, 9]), 0.8).unwrap().median, 5.0);
    }

    #[test]
    fn test_ceiling_ignores_single_outlier() {
        let stats = SampleStats::from_rates(&rates(&[5, 5, 6, 6, 1_000_000]), 0.8).unwrap();

        // The upper quantile is dragged toward the outlier, the median is not
        assert!(stats.base > 1_000.0);
        assert_eq!(stats.median, 6.0);
        assert_eq!(stats.ceiling(2.0), FeeRate::new(12));
        assert_eq!(stats.ceiling(1.0), FeeRate::new(6));
        assert_eq!(stats.ceiling(f64::MAX), FeeRate::new(1_000_000));
    }

    #[test]
    fn test_quantile_is_monotonic_in_percentile() {
        let samples = rates(&[1, 3, 3, 9, 27, 81, 243]);
        let mut previous = 0.0;
        for step in 0..=20 {
            let stats = SampleStats::from_rates(&samples, step as f64 / 20.0).unwrap();
            assert!(stats.base >= previous);
            previous = stats.base;
        }
    }
}
