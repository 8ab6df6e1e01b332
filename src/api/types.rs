use serde::{Deserialize, Serialize};

use crate::balances::types::{AddressAggregate, ChainBalance};
use crate::chains::types::ChainDescriptor;
use crate::price::cache::PriceQuote;

// ============================================================
// Query params & request bodies
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ChainsParams {
    pub keyword: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct QueryBalancesRequest {
    pub addresses: Vec<String>,
    #[serde(default)]
    pub chains: Vec<String>,
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub chains: usize,
}

#[derive(Debug, Serialize)]
pub struct ChainsResponse {
    pub items: Vec<ChainDescriptor>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AggregatedTotals {
    pub total_usd: String,
    pub total_cny: String,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub items: Vec<AddressAggregate>,
    pub total: usize,
    pub eth_price: PriceQuote,
    pub aggregated: AggregatedTotals,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SingleBalanceResponse {
    pub item: SingleBalanceItem,
}

/// The balance fields are flattened in when the fetch succeeded; a failed
/// fetch leaves only the envelope, mirroring how failed chains are dropped
/// from the batch response.
#[derive(Debug, Serialize)]
pub struct SingleBalanceItem {
    pub address: String,
    #[serde(flatten)]
    pub balance: Option<ChainBalance>,
    pub eth_price: PriceQuote,
    pub timestamp: String,
}
