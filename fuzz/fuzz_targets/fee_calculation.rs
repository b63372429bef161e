#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use mempool_fee_estimator::{
    BlockContext, FeeEstimator, FeeLedger, FeeMempoolInfo, FeeMempoolItem, FeeRate,
};

fuzz_target!(|data: &[u8]| {
    // Header: capacity, occupancy, floor, block cost limit and horizon
    if data.len() < 36 {
        return;
    }

    let word = |at: usize| {
        u64::from_le_bytes([
            data[at], data[at + 1], data[at + 2], data[at + 3],
            data[at + 4], data[at + 5], data[at + 6], data[at + 7],
        ])
    };
    let max_size = word(0).max(1);
    let current = word(8).min(max_size);
    let floor = word(16);
    let max_block_cost = word(24).max(1);
    let target = u32::from_le_bytes([data[32], data[33], data[34], data[35]]);

    let Ok(mempool) = FeeMempoolInfo::new(
        max_size,
        FeeRate::new(floor),
        current,
        Utc::now(),
        max_block_cost,
    ) else {
        return;
    };

    // Body: (height step, fee rate) records appended in height order
    let ledger = FeeLedger::new();
    let mut height = 0u32;
    for chunk in data[36..].chunks_exact(9).take(10_000) {
        height = height.saturating_add(u32::from(chunk[0] % 4));
        let rate = u64::from_le_bytes([
            chunk[1], chunk[2], chunk[3], chunk[4],
            chunk[5], chunk[6], chunk[7], chunk[8],
        ]);
        let _ = ledger.append(FeeMempoolItem::new(height, FeeRate::new(rate)));
    }
    let block = BlockContext::new(height);

    // This should not panic regardless of input
    let estimator = FeeEstimator::new();
    if let Ok(estimate) = estimator.estimate_fee(target, &mempool, &ledger, &block, Utc::now()) {
        assert!(estimate.fee_rate >= FeeRate::new(floor));
    }
    let _ = estimator.estimate_fee_strict(target.max(1), &mempool, &ledger, &block, Utc::now());
    let _ = estimator.estimate_fees(&[0, 60, u64::from(target)], &mempool, &ledger, &block, Utc::now());
});
