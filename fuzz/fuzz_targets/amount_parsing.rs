#![no_main]

use libfuzzer_sys::fuzz_target;
use mempool_fee_estimator::{FeeRate, Xch};

// Fuzz the XCH amount parser and the conversion to a fee rate
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // This should handle any text without panicking
    let Ok(amount) = text.parse::<Xch>() else {
        return;
    };

    // Formatting a parsed amount and parsing it again is lossless
    let reparsed: Xch = amount.to_string().parse().expect("formatted amount parses");
    assert_eq!(reparsed, amount);

    let cost = (data.len() as u64).max(1);
    let _ = FeeRate::from_native(amount, cost);
    let _ = amount.to_mojos();
});
