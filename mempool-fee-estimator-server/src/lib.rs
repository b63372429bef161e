//! Mempool Fee Estimator Server - HTTP API for fee-per-cost estimation
//!
//! The mempool and the chain push snapshots, included items and new blocks
//! over HTTP; wallets read estimates back from the same service.

pub mod api;
pub mod cli;
pub mod config;
pub mod server;
pub mod service;
