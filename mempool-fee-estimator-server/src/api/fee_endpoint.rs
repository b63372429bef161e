use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    error::ApiError,
    models::{
        transform_fee_estimate, transform_fee_estimate_group, FeeEstimateGroupResponse,
        FeeEstimateResponse,
    },
};
use crate::service::FeeTracker;

/// Time targets, in seconds, answered when a request names none
pub const DEFAULT_TIME_TARGETS: [u64; 6] = [60, 120, 300, 600, 1_800, 3_600];

/// Optional cost of the spend being priced
#[derive(Debug, Default, Deserialize)]
pub struct CostQuery {
    pub cost: Option<u64>,
}

/// Query parameters for `GET /fees`
#[derive(Debug, Default, Deserialize)]
pub struct FeesQuery {
    /// Comma-separated time targets in seconds, e.g. `60,300`
    pub target_times: Option<String>,
    pub cost: Option<u64>,
}

/// GET /fees - Returns fee estimates for a set of time targets
pub async fn get_fees(
    Query(query): Query<FeesQuery>,
    State(tracker): State<Arc<FeeTracker>>,
) -> Result<Json<FeeEstimateGroupResponse>, ApiError> {
    let targets = match query.target_times.as_deref() {
        Some(raw) => parse_time_targets(raw)?,
        None => DEFAULT_TIME_TARGETS.to_vec(),
    };

    info!("Received request for fee estimates at {:?}s", targets);

    let group = tracker.estimate_for_times(&targets).await.map_err(|err| {
        warn!("Failed to calculate fee estimates: {}", err);
        ApiError::from(err)
    })?;

    let response = transform_fee_estimate_group(group, query.cost);
    debug!(
        "Returning fee estimates with {} targets",
        response.estimates.len()
    );
    Ok(Json(response))
}

/// GET /fees/target/{num_blocks} - Returns the fee estimate for a block horizon
pub async fn get_fee_for_target(
    Path(num_blocks): Path<u32>,
    Query(query): Query<CostQuery>,
    State(tracker): State<Arc<FeeTracker>>,
) -> Result<Json<FeeEstimateResponse>, ApiError> {
    info!(
        "Received request for fee estimate targeting {} blocks",
        num_blocks
    );

    let estimate = tracker.estimate_for_blocks(num_blocks).await.map_err(|err| {
        warn!("Failed to calculate fee estimate: {}", err);
        ApiError::from(err)
    })?;

    debug!("Returning fee estimate: {}", estimate);
    Ok(Json(transform_fee_estimate(estimate, query.cost)?))
}

/// Parses a comma-separated list of seconds
fn parse_time_targets(raw: &str) -> Result<Vec<u64>, ApiError> {
    let targets = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid time target: {part:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if targets.is_empty() {
        return Err(ApiError::BadRequest(
            "target_times must name at least one target".to_string(),
        ));
    }
    Ok(targets)
}

#[cfg(test)]
#[path = "fee_endpoint_tests.rs"]
mod tests;
