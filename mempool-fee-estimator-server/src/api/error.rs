use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mempool_fee_estimator::EstimatorError;
use thiserror::Error;

use crate::service::TrackerError;

/// API-specific error types with proper HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request - client error (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict - the submitted data contradicts what is already known (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Service unavailable - temporary issue (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error - unexpected failure (500)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<EstimatorError> for ApiError {
    fn from(err: EstimatorError) -> Self {
        match err {
            // Malformed requests are client errors (400)
            EstimatorError::InvalidArgument(_)
            | EstimatorError::InvalidHorizon(_)
            | EstimatorError::Overflow(_) => ApiError::BadRequest(err.to_string()),
            // Events that contradict the ledger, chain or snapshot rules (409)
            EstimatorError::InvariantViolation(_)
            | EstimatorError::OutOfOrder { .. }
            | EstimatorError::NonMonotonic { .. } => ApiError::Conflict(err.to_string()),
            // Missing data is a temporary issue (503)
            EstimatorError::InsufficientData(_) => ApiError::ServiceUnavailable(err.to_string()),
            EstimatorError::InvalidConfig(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::EstimationError(err) => err.into(),
            TrackerError::NoSnapshot => {
                ApiError::ServiceUnavailable("No mempool snapshot received yet".to_string())
            }
        }
    }
}
