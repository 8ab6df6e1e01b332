use std::time::Duration;

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;

use crate::balances::types::{round2, ChainBalance, ChainOutcome};
use crate::chains::types::ChainDescriptor;
use crate::price::cache::PriceQuote;

/// One (address, chain) native-balance query. Implementations must return
/// every failure as a `ChainBalance` error payload; nothing raises past this
/// boundary, so the aggregator can treat each unit as infallible data.
#[async_trait]
pub trait BalanceFetcher: Send + Sync {
    async fn fetch(
        &self,
        address: &str,
        chain: &ChainDescriptor,
        quote: &PriceQuote,
    ) -> ChainBalance;
}

/// Queries a chain's JSON-RPC endpoint for the native coin balance and
/// converts it to decimal coin and fiat figures. No retries; a hung endpoint
/// is cut off by the per-call timeout.
pub struct RpcBalanceFetcher {
    request_timeout: Duration,
}

impl RpcBalanceFetcher {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

#[async_trait]
impl BalanceFetcher for RpcBalanceFetcher {
    async fn fetch(
        &self,
        address: &str,
        chain: &ChainDescriptor,
        quote: &PriceQuote,
    ) -> ChainBalance {
        let Some(rpc_url) = chain.rpc_url.as_deref() else {
            return ChainBalance::failure(
                chain,
                format!("No RPC URL configured for chain {}", chain.name),
            );
        };

        let wallet: Address = match address.parse() {
            Ok(wallet) => wallet,
            Err(e) => {
                return ChainBalance::failure(chain, format!("Invalid address '{}': {}", address, e))
            }
        };

        let url = match rpc_url.parse() {
            Ok(url) => url,
            Err(e) => {
                return ChainBalance::failure(chain, format!("Invalid RPC URL '{}': {}", rpc_url, e))
            }
        };
        let provider = ProviderBuilder::new().connect_http(url);

        let wei = match tokio::time::timeout(self.request_timeout, provider.get_balance(wallet)).await
        {
            Ok(Ok(wei)) => wei,
            Ok(Err(e)) => {
                tracing::warn!(chain = %chain.name, address = %address, error = %e, "Balance query failed");
                return ChainBalance::failure(chain, e.to_string());
            }
            Err(_) => {
                tracing::warn!(chain = %chain.name, address = %address, "Balance query timed out");
                return ChainBalance::failure(
                    chain,
                    format!(
                        "RPC request timed out after {}ms",
                        self.request_timeout.as_millis()
                    ),
                );
            }
        };

        let balance = format_ether(wei);
        let amount: f64 = balance.parse().unwrap_or_default();

        ChainBalance {
            chain: chain.name.clone(),
            chain_id: chain.id,
            outcome: ChainOutcome::Balance {
                balance_wei: wei.to_string(),
                balance,
                balance_usd: round2(amount * quote.usd),
                balance_cny: round2(amount * quote.cny),
                explorer: explorer_address_url(chain, address),
            },
        }
    }
}

/// Explorer deep link for an address, when the chain has an explorer at all.
fn explorer_address_url(chain: &ChainDescriptor, address: &str) -> Option<String> {
    chain
        .explorer_url
        .as_ref()
        .map(|base| format!("{}/address/{}", base, address))
}
