use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use futures::future::join_all;

use crate::balances::fetcher::BalanceFetcher;
use crate::balances::types::{round2, AddressAggregate, BalanceReport, ChainBalance, ChainOutcome};
use crate::chains::registry::ChainRegistry;
use crate::chains::types::ChainDescriptor;
use crate::price::cache::{PriceCache, PriceQuote};

/// Orchestrates the addresses × chains cross-product through the fetcher and
/// merges the per-unit outcomes into per-address rollups.
pub struct BalanceAggregator {
    registry: Arc<ChainRegistry>,
    price_cache: Arc<PriceCache>,
    fetcher: Arc<dyn BalanceFetcher>,
}

impl BalanceAggregator {
    pub fn new(
        registry: Arc<ChainRegistry>,
        price_cache: Arc<PriceCache>,
        fetcher: Arc<dyn BalanceFetcher>,
    ) -> Self {
        Self {
            registry,
            price_cache,
            fetcher,
        }
    }

    /// Queries every address on every selected chain concurrently and
    /// collects every outcome before merging. Unknown chain keys are dropped
    /// from the selection and chain-level fetch failures are dropped from the
    /// per-address map; neither aborts the request or any sibling unit.
    pub async fn query_balances(&self, addresses: &[String], chain_keys: &[String]) -> BalanceReport {
        let chains = self.select_chains(chain_keys);

        // One snapshot per request keeps every conversion in the response
        // mutually consistent even though the coin amounts come from
        // independently-timed RPC calls.
        let quote = self.price_cache.get_quote().await;

        tracing::debug!(
            addresses = addresses.len(),
            chains = chains.len(),
            "Dispatching balance fan-out"
        );

        let fetcher = &self.fetcher;
        let quote_ref = &quote;
        let units = addresses.iter().flat_map(|address| {
            chains
                .iter()
                .map(move |chain| fetcher.fetch(address, chain, quote_ref))
        });
        let results = join_all(units).await;

        let mut items = Vec::with_capacity(addresses.len());
        let mut grand_usd = 0.0;
        let mut grand_cny = 0.0;

        for (index, address) in addresses.iter().enumerate() {
            let per_chain = &results[index * chains.len()..(index + 1) * chains.len()];
            let (aggregate, usd, cny) = merge_address(address, per_chain, &quote);
            grand_usd += usd;
            grand_cny += cny;
            items.push(aggregate);
        }

        BalanceReport {
            items,
            total_usd: round2(grand_usd),
            total_cny: round2(grand_cny),
            quote,
        }
    }

    /// Resolves the requested chain keys, silently dropping unknown ones; an
    /// empty request selects the full canonical set.
    fn select_chains(&self, chain_keys: &[String]) -> Vec<ChainDescriptor> {
        if chain_keys.is_empty() {
            return self.registry.all().to_vec();
        }

        chain_keys
            .iter()
            .filter_map(|key| {
                let resolved = self.registry.resolve(key);
                if resolved.is_none() {
                    tracing::warn!(key = %key, "Unknown chain key, skipping");
                }
                resolved.cloned()
            })
            .collect()
    }
}

/// Folds one address's chain results, in chain-selection order, into its
/// aggregate. Returns the aggregate plus the unrounded fiat contributions for
/// the request-level grand totals; those must never be re-derived from the
/// already-rounded per-address strings.
fn merge_address(
    address: &str,
    results: &[ChainBalance],
    quote: &PriceQuote,
) -> (AddressAggregate, f64, f64) {
    let mut chains = Vec::new();
    let mut total_balance = BigDecimal::default();
    let mut usd = 0.0;
    let mut cny = 0.0;

    for result in results {
        match &result.outcome {
            ChainOutcome::Balance { balance, .. } => {
                if let Ok(amount) = BigDecimal::from_str(balance) {
                    total_balance += amount;
                }
                let amount: f64 = balance.parse().unwrap_or_default();
                usd += amount * quote.usd;
                cny += amount * quote.cny;
                chains.push(result.clone());
            }
            ChainOutcome::Error { error } => {
                tracing::debug!(
                    address = %address,
                    chain = %result.chain,
                    error = %error,
                    "Dropping failed chain query"
                );
            }
        }
    }

    let aggregate = AddressAggregate {
        address: address.to_string(),
        chains,
        total_balance: total_balance.normalized().to_string(),
        total_usd: round2(usd),
        total_cny: round2(cny),
    };

    (aggregate, usd, cny)
}
