//! Services behind the HTTP API

mod fee_tracker;

pub use fee_tracker::{FeeTracker, TrackerError, BLOCK_LAG_WARNING};
