//! Mempool Fee Estimator - fee-per-cost estimation for a transaction relay node
//!
//! This library recommends the fee rate, in mojos per CLVM cost, that a new
//! item should pay to be included within a target number of blocks. It
//! combines three signals: the fee rates recently included items actually
//! paid, how full the mempool is, and the mempool's replacement floor.
//!
//! # Features
//! - Exact XCH/mojo conversion with no floating point in the money path
//! - Validated, immutable mempool snapshots
//! - An append-only inclusion ledger with snapshot-isolated queries
//! - Congestion-biased percentile estimates with a confidence grade
//!
//! # Example
//! ```
//! use mempool_fee_estimator::{
//!     BlockContext, FeeBlockInfo, FeeEstimator, FeeLedger, FeeMempoolInfo, FeeMempoolItem, FeeRate,
//! };
//! use chrono::Utc;
//!
//! // Initialize the estimator with default settings
//! let fee_estimator = FeeEstimator::new();
//! let ledger = FeeLedger::new();
//! let block = BlockContext::new(4_000_000);
//!
//! // The chain and mempool feed inclusion facts as blocks arrive
//! block.apply(&FeeBlockInfo::new(4_000_001)).unwrap();
//! ledger.append(FeeMempoolItem::new(4_000_001, FeeRate::new(6))).unwrap();
//!
//! let now = Utc::now();
//! let mempool = FeeMempoolInfo::new(
//!     550_000_000_000, // max_size_in_cost
//!     FeeRate::new(5), // minimum_fee_per_cost_to_replace
//!     100_000_000_000, // current_mempool_cost
//!     now,
//!     11_000_000_000,  // max_block_cost
//! ).unwrap();
//!
//! let estimate = fee_estimator.estimate_fee(3, &mempool, &ledger, &block, now).unwrap();
//! println!("Recommended: {}", estimate);
//! assert!(estimate.fee_rate >= FeeRate::new(5));
//! ```

// Public modules
pub mod error;

// Data structures
mod block_context;
mod config;
mod fee_estimate;
mod fee_estimator;
mod fee_rate;
mod ledger;
mod mempool_info;

// Internal implementation modules
pub(crate) mod internal;

// Public exports
pub use block_context::{BlockContext, FeeBlockInfo};
pub use config::EstimatorConfig;
pub use error::{EstimatorError, Result};
pub use fee_estimate::{Confidence, EstimateSource, FeeEstimate, FeeEstimateGroup, TimedFeeEstimate};
pub use fee_estimator::FeeEstimator;
pub use fee_rate::{FeeRate, Xch, MOJO_PER_XCH};
pub use ledger::{FeeLedger, FeeMempoolItem, LedgerConfig, LedgerQuery};
pub use mempool_info::FeeMempoolInfo;
