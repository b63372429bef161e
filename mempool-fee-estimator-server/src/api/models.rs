use chrono::{DateTime, Utc};
use mempool_fee_estimator::{
    Confidence, EstimateSource, FeeBlockInfo, FeeEstimate, FeeEstimateGroup, FeeMempoolInfo,
    FeeMempoolItem, FeeRate, Result,
};
use serde::{Deserialize, Serialize};

/// Mempool snapshot as submitted by the mempool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolInfoRequest {
    pub max_size_in_cost: u64,
    /// Replacement floor in mojos per cost
    pub minimum_fee_per_cost_to_replace: u64,
    pub current_mempool_cost: u64,
    pub max_block_cost: u64,
    /// Capture time; the server's clock when omitted
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

impl MempoolInfoRequest {
    /// Validates the request into a snapshot
    pub fn into_info(self) -> Result<FeeMempoolInfo> {
        FeeMempoolInfo::new(
            self.max_size_in_cost,
            FeeRate::new(self.minimum_fee_per_cost_to_replace),
            self.current_mempool_cost,
            self.time.unwrap_or_else(Utc::now),
            self.max_block_cost,
        )
    }
}

/// An included item as submitted by the mempool
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncludedItemRequest {
    pub height_added: u32,
    /// Fee rate the item paid, in mojos per cost
    pub fee_per_cost: u64,
}

impl From<IncludedItemRequest> for FeeMempoolItem {
    fn from(item: IncludedItemRequest) -> Self {
        FeeMempoolItem::new(item.height_added, FeeRate::new(item.fee_per_cost))
    }
}

/// One included item or a batch of them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludedItemsRequest {
    Many(Vec<IncludedItemRequest>),
    One(IncludedItemRequest),
}

impl IncludedItemsRequest {
    pub fn into_items(self) -> Vec<FeeMempoolItem> {
        match self {
            IncludedItemsRequest::Many(items) => items.into_iter().map(Into::into).collect(),
            IncludedItemsRequest::One(item) => vec![item.into()],
        }
    }
}

/// Confirmed block as submitted by the chain
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockRequest {
    pub block_height: u32,
}

impl From<BlockRequest> for FeeBlockInfo {
    fn from(block: BlockRequest) -> Self {
        FeeBlockInfo::new(block.block_height)
    }
}

/// Acknowledgement for ingest endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IngestResponse {
    /// Number of records accepted by this request
    pub accepted: usize,
    pub block_height: u32,
    pub ledger_size: usize,
}

/// Response format for a single fee estimate
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FeeEstimateResponse {
    /// Recommended fee rate in mojos per cost
    pub fee_rate: u64,

    /// Recommended fee rate in XCH per cost, as an exact decimal string
    pub fee_rate_xch: String,

    pub confidence: Confidence,
    pub target_blocks: u32,
    pub sample_count: usize,
    pub source: EstimateSource,

    /// Total fee in mojos for the requested cost, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,

    /// ISO 8601 formatted timestamp of the mempool snapshot used
    pub mempool_update_time: String,
}

/// Outcome for one time target
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TimedEstimateResponse {
    pub time_target: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<FeeEstimateResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response format for a group of time targets
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FeeEstimateGroupResponse {
    pub estimates: Vec<TimedEstimateResponse>,
}

/// Result of converting an XCH amount over a cost to a fee rate
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ConvertResponse {
    /// Normalized XCH amount
    pub amount: String,
    pub cost: u64,
    /// Fee rate in mojos per cost, rounded toward zero
    pub fee_rate: u64,
}

/// Transform an internal FeeEstimate to the API response format
pub fn transform_fee_estimate(estimate: FeeEstimate, cost: Option<u64>) -> Result<FeeEstimateResponse> {
    let fee = cost.map(|cost| estimate.fee_for_cost(cost)).transpose()?;

    Ok(FeeEstimateResponse {
        fee_rate: estimate.fee_rate.to_subunit_per_cost(),
        fee_rate_xch: estimate.fee_rate.to_native_per_cost().to_string(),
        confidence: estimate.confidence,
        target_blocks: estimate.target_blocks,
        sample_count: estimate.sample_count,
        source: estimate.source,
        fee,
        mempool_update_time: format_timestamp(estimate.mempool_time),
    })
}

/// Transform an internal FeeEstimateGroup to the API response format.
///
/// A target whose total fee overflows reports the overflow as its error.
pub fn transform_fee_estimate_group(
    group: FeeEstimateGroup,
    cost: Option<u64>,
) -> FeeEstimateGroupResponse {
    let estimates = group
        .estimates
        .into_iter()
        .map(|timed| {
            let (estimate, error) = match timed.estimate.map(|e| transform_fee_estimate(e, cost)) {
                Some(Ok(response)) => (Some(response), None),
                Some(Err(err)) => (None, Some(err.to_string())),
                None => (None, timed.error),
            };
            TimedEstimateResponse {
                time_target: timed.time_target,
                estimate,
                error,
            }
        })
        .collect();

    FeeEstimateGroupResponse { estimates }
}

/// Format timestamp to ISO 8601 with milliseconds and UTC timezone
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    // Format: "2025-01-20T12:00:00.000Z"
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
