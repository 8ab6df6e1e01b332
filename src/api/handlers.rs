use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use super::types::*;
use super::AppState;
use crate::chains::registry::ChainRegistry;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        chains: state.registry.all().len(),
    })
}

// ============================================================
// Chains
// ============================================================

pub async fn list_chains(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChainsParams>,
) -> Json<ChainsResponse> {
    let filtered = state.registry.find_by_keyword(params.keyword.as_deref());
    let page = ChainRegistry::paginate(&filtered, params.offset, params.limit);

    Json(ChainsResponse {
        items: page.to_vec(),
        total: filtered.len(),
    })
}

// ============================================================
// Balances
// ============================================================

pub async fn query_balances(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryBalancesRequest>,
) -> ApiResult<BalancesResponse> {
    let addresses = validate_addresses(&request.addresses, state.max_addresses)?;

    let report = state
        .aggregator
        .query_balances(&addresses, &request.chains)
        .await;

    Ok(Json(BalancesResponse {
        total: report.items.len(),
        items: report.items,
        eth_price: report.quote,
        aggregated: AggregatedTotals {
            total_usd: report.total_usd,
            total_cny: report.total_cny,
        },
        timestamp: Utc::now().to_rfc3339(),
    }))
}

pub async fn single_chain_balance(
    State(state): State<Arc<AppState>>,
    Path((chain_key, address)): Path<(String, String)>,
) -> ApiResult<SingleBalanceResponse> {
    if state.registry.resolve(&chain_key).is_none() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown chain '{}'", chain_key),
        ));
    }

    let address = address.trim().to_string();
    if address.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Address must be non-empty"));
    }

    let report = state
        .aggregator
        .query_balances(std::slice::from_ref(&address), std::slice::from_ref(&chain_key))
        .await;

    let balance = report
        .items
        .into_iter()
        .next()
        .and_then(|aggregate| aggregate.chains.into_iter().next());

    Ok(Json(SingleBalanceResponse {
        item: SingleBalanceItem {
            address,
            balance,
            eth_price: report.quote,
            timestamp: Utc::now().to_rfc3339(),
        },
    }))
}

/// Boundary validation: 1..=max trimmed, non-empty addresses. The aggregator
/// itself accepts whatever it is handed.
fn validate_addresses(
    addresses: &[String],
    max: usize,
) -> Result<Vec<String>, (StatusCode, Json<ErrorResponse>)> {
    if addresses.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "At least one address is required",
        ));
    }
    if addresses.len() > max {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("At most {} addresses per request", max),
        ));
    }

    let trimmed: Vec<String> = addresses.iter().map(|a| a.trim().to_string()).collect();
    if trimmed.iter().any(|a| a.is_empty()) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Addresses must be non-empty",
        ));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_validate_addresses_trims_and_bounds() {
        let ok = validate_addresses(&list(&["  0xAaA ", "0xBbB"]), 50).unwrap();
        assert_eq!(ok, vec!["0xAaA", "0xBbB"]);

        assert!(validate_addresses(&[], 50).is_err());
        assert!(validate_addresses(&list(&["0xAaA", "   "]), 50).is_err());

        let too_many: Vec<String> = (0..51).map(|i| format!("0x{}", i)).collect();
        assert!(validate_addresses(&too_many, 50).is_err());
        assert!(validate_addresses(&too_many[..50], 50).is_ok());
    }
}
