//! End-to-end fee estimation tests
//!
//! These tests drive the estimator the way a node would: blocks arrive,
//! included items are recorded, and estimates are requested against the
//! latest mempool snapshot.


use chrono::{Duration, Utc};
use mempool_fee_estimator::{
    BlockContext, Confidence, EstimateSource, EstimatorConfig, FeeEstimator, FeeMempoolInfo,
    FeeRate,
};
use test_utils::{TestUtils, MAX_BLOCK_COST};

#[test]
fn test_reference_scenario() {
    // max=1_000_000, current=900_000, floor=5, max_block_cost=11_000_000
    // with five samples {4, 6, 8, 10, 20} inside the horizon
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let mempool = TestUtils::create_mempool(900_000, 5, now);
    let ledger = TestUtils::create_ledger_at(500, &[4, 6, 8, 10, 20]);
    let block = BlockContext::new(500);

    let estimate = estimator
        .estimate_fee(3, &mempool, &ledger, &block, now)
        .unwrap();

    assert!(estimate.fee_rate >= FeeRate::new(10), "got {}", estimate.fee_rate);
    assert!(estimate.fee_rate >= FeeRate::new(5));
    assert!(estimate.fee_rate <= FeeRate::new(20));
    assert_eq!(estimate.confidence, Confidence::Medium);
    assert_eq!(estimate.sample_count, 5);
    assert_eq!(estimate.source, EstimateSource::History);
    assert_eq!(estimate.target_blocks, 3);
    assert_eq!(estimate.mempool_time, now);
}

#[test]
fn test_reference_scenario_high_confidence_with_lower_threshold() {
    let estimator = FeeEstimator::with_config(EstimatorConfig {
        medium_confidence_samples: 2,
        high_confidence_samples: 5,
        ..EstimatorConfig::default()
    })
    .unwrap();

    let now = Utc::now();
    let estimate = estimator
        .estimate_fee(
            3,
            &TestUtils::create_mempool(900_000, 5, now),
            &TestUtils::create_ledger_at(500, &[4, 6, 8, 10, 20]),
            &BlockContext::new(500),
            now,
        )
        .unwrap();

    assert_eq!(estimate.confidence, Confidence::High);
}

#[test]
fn test_empty_ledger_returns_floor() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let estimate = estimator
        .estimate_fee(
            10,
            &TestUtils::create_mempool(999_999, 42, now),
            &TestUtils::create_ledger(&[]),
            &BlockContext::new(1),
            now,
        )
        .unwrap();

    assert_eq!(estimate.fee_rate, FeeRate::new(42));
    assert_eq!(estimate.confidence, Confidence::Low);
    assert!(!estimate.has_history());
}

#[test]
fn test_chain_progression_shifts_window() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let mempool = TestUtils::create_mempool(600_000, 1, now);

    // Ten blocks of cheap inclusions followed by ten blocks of expensive ones
    let (ledger, block) = TestUtils::simulate_chain(1_000, 10, 5, &[2, 3, 4]);
    let cheap = estimator
        .estimate_fee(2, &mempool, &ledger, &block, now)
        .unwrap();

    for offset in 11..=20 {
        let height = 1_000 + offset;
        block.advance(height).unwrap();
        for rate in [40, 50, 60] {
            ledger
                .append(mempool_fee_estimator::FeeMempoolItem::new(
                    height,
                    FeeRate::new(rate),
                ))
                .unwrap();
        }
    }

    let expensive = estimator
        .estimate_fee(2, &mempool, &ledger, &block, now)
        .unwrap();

    assert!(cheap.fee_rate <= FeeRate::new(4));
    assert!(expensive.fee_rate >= FeeRate::new(40));
    // Window of 2*2 blocks back from height 1020 covers heights 1016..=1020
    assert_eq!(expensive.sample_count, 15);
}

#[test]
fn test_longer_horizon_gathers_more_samples() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let mempool = TestUtils::create_mempool(100_000, 0, now);
    let (ledger, block) = TestUtils::simulate_chain(0, 50, 2, &[5, 7, 9]);

    let short = estimator.estimate_fee(1, &mempool, &ledger, &block, now).unwrap();
    let long = estimator.estimate_fee(10, &mempool, &ledger, &block, now).unwrap();

    assert_eq!(short.sample_count, 6);
    assert_eq!(long.sample_count, 42);
    assert!(long.confidence >= short.confidence);
}

#[test]
fn test_prune_removes_old_history() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let mempool = TestUtils::create_mempool(100_000, 2, now);
    let (ledger, block) = TestUtils::simulate_chain(0, 100, 1, &[10]);

    // Newest height is 100, so heights 1..=79 fall outside a 20 block retention
    assert_eq!(ledger.prune(20), 79);

    // A horizon reaching past the retention window only sees what was kept
    let estimate = estimator.estimate_fee(100, &mempool, &ledger, &block, now).unwrap();
    assert_eq!(estimate.sample_count, 21);
}

#[test]
fn test_stale_snapshot_is_low_confidence() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let (ledger, block) = TestUtils::simulate_chain(0, 10, 10, &[3, 4, 5, 6]);

    let fresh = TestUtils::create_mempool(300_000, 1, now - Duration::seconds(30));
    let stale = TestUtils::create_mempool(300_000, 1, now - Duration::minutes(30));

    let fresh_estimate = estimator.estimate_fee(5, &fresh, &ledger, &block, now).unwrap();
    let stale_estimate = estimator.estimate_fee(5, &stale, &ledger, &block, now).unwrap();

    assert_eq!(fresh_estimate.confidence, Confidence::High);
    assert_eq!(stale_estimate.confidence, Confidence::Low);
}

#[test]
fn test_backlog_beyond_horizon_raises_estimate() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let ledger = TestUtils::create_ledger_at(10, &[2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
    let block = BlockContext::new(10);

    // Same occupancy, but the second mempool needs 5 blocks to clear
    let light = FeeMempoolInfo::new(1_000_000_000, FeeRate::ZERO, 100_000_000, now, MAX_BLOCK_COST * 100)
        .unwrap();
    let heavy = FeeMempoolInfo::new(1_000_000_000, FeeRate::ZERO, 100_000_000, now, 20_000_000)
        .unwrap();

    let light_estimate = estimator.estimate_fee(2, &light, &ledger, &block, now).unwrap();
    let heavy_estimate = estimator.estimate_fee(2, &heavy, &ledger, &block, now).unwrap();

    assert!(heavy_estimate.fee_rate > light_estimate.fee_rate);
}

#[test]
fn test_time_targets() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let mempool = TestUtils::create_mempool(500_000, 1, now);
    let (ledger, block) = TestUtils::simulate_chain(0, 200, 3, &[5, 10, 15]);

    let group = estimator.estimate_fees(&[60, 120, 300, 600], &mempool, &ledger, &block, now);

    assert!(group.is_complete());
    for target in [60, 120, 300, 600] {
        let estimate = group.get(target).expect("estimate for every target");
        assert_eq!(estimate.target_blocks, estimator.blocks_for_time(target));
        assert!(estimate.fee_rate >= FeeRate::new(1));
    }

    let direct = estimator
        .estimate_fee_for_time(300, &mempool, &ledger, &block, now)
        .unwrap();
    assert_eq!(Some(&direct), group.get(300));
}

#[test]
fn test_fee_for_cost() {
    let estimator = FeeEstimator::new();
    let now = Utc::now();
    let estimate = estimator
        .estimate_fee(
            1,
            &TestUtils::create_mempool(0, 0, now),
            &TestUtils::create_ledger_at(7, &[6]),
            &BlockContext::new(7),
            now,
        )
        .unwrap();

    assert_eq!(estimate.fee_rate, FeeRate::new(6));
    assert_eq!(estimate.fee_for_cost(10_000_000).unwrap(), 60_000_000);
}
