use axum::{extract::Query, Json};
use mempool_fee_estimator::{FeeRate, Xch};
use serde::Deserialize;
use tracing::debug;

use super::{error::ApiError, models::ConvertResponse};

/// Query parameters for `GET /convert`
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Decimal XCH amount, e.g. `0.00005`
    pub amount: String,
    pub cost: u64,
}

/// GET /convert - Converts an XCH amount paid for a cost into a fee rate
pub async fn get_convert(Query(query): Query<ConvertQuery>) -> Result<Json<ConvertResponse>, ApiError> {
    let amount: Xch = query.amount.parse()?;
    let fee_rate = FeeRate::from_native(amount, query.cost)?;

    debug!("Converted {} XCH over {} cost to {}", amount, query.cost, fee_rate);

    Ok(Json(ConvertResponse {
        amount: amount.to_string(),
        cost: query.cost,
        fee_rate: fee_rate.to_subunit_per_cost(),
    }))
}
