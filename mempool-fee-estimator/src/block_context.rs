use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{EstimatorError, Result};

/// The per-block fact supplied by the chain for every confirmed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBlockInfo {
    /// Height of the confirmed block
    pub block_height: u32,
}

impl FeeBlockInfo {
    /// Creates a new block fact.
    pub fn new(block_height: u32) -> Self {
        Self { block_height }
    }
}

/// The latest known block height, the time axis of the ledger.
///
/// Heights only move forward. The height is a single atomic word, so a
/// reader on another thread always sees either the old or the new height.
#[derive(Debug, Default)]
pub struct BlockContext {
    height: AtomicU32,
}

impl BlockContext {
    /// Creates a context starting at `height`.
    pub fn new(height: u32) -> Self {
        Self {
            height: AtomicU32::new(height),
        }
    }

    /// Returns the current block height.
    pub fn height(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }

    /// Moves the context to `new_height`.
    ///
    /// # Errors
    /// `NonMonotonic` if `new_height` is not strictly above the current height.
    pub fn advance(&self, new_height: u32) -> Result<()> {
        self.height
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (new_height > current).then_some(new_height)
            })
            .map(|_| ())
            .map_err(|current| EstimatorError::NonMonotonic {
                new_height,
                current,
            })
    }

    /// Advances the context to the height of a newly confirmed block.
    pub fn apply(&self, block: &FeeBlockInfo) -> Result<()> {
        self.advance(block.block_height)
    }
}
