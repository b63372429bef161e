use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    error::ApiError,
    models::{BlockRequest, IncludedItemsRequest, IngestResponse, MempoolInfoRequest},
};
use crate::service::FeeTracker;

/// POST /mempool/info - Replaces the latest mempool snapshot
pub async fn post_mempool_info(
    State(tracker): State<Arc<FeeTracker>>,
    Json(request): Json<MempoolInfoRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let info = request.into_info().map_err(|err| {
        warn!("Rejected mempool snapshot: {}", err);
        ApiError::from(err)
    })?;

    tracker.update_mempool_info(info).await;
    Ok(Json(ack(&tracker, 1)))
}

/// POST /mempool/included - Records one or more included items
pub async fn post_included(
    State(tracker): State<Arc<FeeTracker>>,
    Json(request): Json<IncludedItemsRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let items = request.into_items();
    let accepted = tracker.add_included_items(&items)?;

    debug!("Recorded {} included items", accepted);
    Ok(Json(ack(&tracker, accepted)))
}

/// POST /blocks - Advances the chain height
pub async fn post_block(
    State(tracker): State<Arc<FeeTracker>>,
    Json(request): Json<BlockRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    tracker.new_block(request.into()).map_err(|err| {
        warn!("Rejected block {}: {}", request.block_height, err);
        ApiError::from(err)
    })?;

    Ok(Json(ack(&tracker, 1)))
}

fn ack(tracker: &FeeTracker, accepted: usize) -> IngestResponse {
    IngestResponse {
        accepted,
        block_height: tracker.block_height(),
        ledger_size: tracker.ledger_len(),
    }
}
