#![no_main]

use libfuzzer_sys::fuzz_target;
use mempool_fee_estimator::FeeMempoolInfo;

fuzz_target!(|data: &[u8]| {
    // Try to parse arbitrary data as a JSON snapshot
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(info) = serde_json::from_str::<FeeMempoolInfo>(s) {
            // Anything that parses must satisfy the occupancy invariant
            assert!(info.current_mempool_cost() <= info.max_size_in_cost());
        }
    }

    // Also test with valid JSON structure but fuzzed values
    if data.len() >= 24 {
        let word = |at: usize| {
            u64::from_le_bytes([
                data[at], data[at + 1], data[at + 2], data[at + 3],
                data[at + 4], data[at + 5], data[at + 6], data[at + 7],
            ])
        };

        let json = format!(
            r#"{{
                "max_size_in_cost": {},
                "minimum_fee_per_cost_to_replace": {{"mojos_per_clvm_cost": 5}},
                "current_mempool_cost": {},
                "time": "2024-01-01T00:00:00Z",
                "max_block_cost": {}
            }}"#,
            word(0),
            word(8),
            word(16)
        );

        let parsed = serde_json::from_str::<FeeMempoolInfo>(&json);
        let valid = word(0) > 0 && word(16) > 0 && word(8) <= word(0);
        assert_eq!(parsed.is_ok(), valid);
    }
});
