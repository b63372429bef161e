use thiserror::Error;

/// Main error type for the mempool-fee-estimator library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimatorError {
    /// Malformed input, such as a zero cost or a negative amount.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A unit conversion or fee-rate operation exceeded the representable range.
    #[error("Overflow: {0}")]
    Overflow(String),

    /// A collaborator supplied data that breaks a model invariant.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A ledger record arrived with a height below the newest stored height.
    #[error("Out of order record: height {height} is below newest height {newest}")]
    OutOfOrder { height: u32, newest: u32 },

    /// The block context was asked to move backwards or stand still.
    #[error("Non-monotonic block height: {new_height} does not advance past {current}")]
    NonMonotonic { new_height: u32, current: u32 },

    /// The requested inclusion horizon is not a positive number of blocks.
    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),

    /// Strict estimation found no samples to work from.
    #[error("Insufficient data for estimation: {0}")]
    InsufficientData(String),

    /// Invalid estimator or ledger configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Type alias for Results in this library.
pub type Result<T> = std::result::Result<T, EstimatorError>;

impl EstimatorError {
    /// Creates an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an Overflow error.
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    /// Creates an InvariantViolation error.
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Creates an InvalidHorizon error.
    pub fn invalid_horizon(msg: impl Into<String>) -> Self {
        Self::InvalidHorizon(msg.into())
    }

    /// Creates an InsufficientData error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
