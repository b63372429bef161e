//! HTTP API endpoints for the fee estimation service

mod convert_endpoint;
mod error;
mod fee_endpoint;
mod ingest_endpoint;
mod models;

pub use convert_endpoint::get_convert;
pub use error::ApiError;
pub use fee_endpoint::{get_fee_for_target, get_fees, DEFAULT_TIME_TARGETS};
pub use ingest_endpoint::{post_block, post_included, post_mempool_info};
pub use models::{
    BlockRequest, ConvertResponse, FeeEstimateGroupResponse, FeeEstimateResponse,
    IncludedItemRequest, IncludedItemsRequest, IngestResponse, MempoolInfoRequest,
    TimedEstimateResponse,
};
