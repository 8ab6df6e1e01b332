use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::chains::types::ChainDescriptor;
use crate::price::cache::PriceQuote;

/// Rounds a fiat amount to 2 decimal places, half away from zero, and renders
/// it with exactly two fraction digits. Applied once per displayed figure;
/// summing already-rounded figures does not reproduce a separately-rounded
/// sum, so totals must always be rounded from unrounded contributions.
pub fn round2(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// Outcome of one (address, chain) balance query. Exactly one variant holds:
/// either the populated balance or a chain-level error message, never both.
/// Serialized untagged so both shapes flatten into the enclosing object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChainOutcome {
    Balance {
        balance_wei: String,
        balance: String,
        balance_usd: String,
        balance_cny: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        explorer: Option<String>,
    },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainBalance {
    pub chain: String,
    pub chain_id: u64,
    #[serde(flatten)]
    pub outcome: ChainOutcome,
}

impl ChainBalance {
    pub fn failure(chain: &ChainDescriptor, error: impl Into<String>) -> Self {
        Self {
            chain: chain.name.clone(),
            chain_id: chain.id,
            outcome: ChainOutcome::Error {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ChainOutcome::Balance { .. })
    }
}

/// Per-address rollup. `chains` holds only the successful chain queries, in
/// chain-selection order; failed queries are dropped without affecting the
/// rest of the address. Totals cover the successful entries only, all
/// converted with the single quote of the enclosing request.
#[derive(Debug, Clone, Serialize)]
pub struct AddressAggregate {
    pub address: String,
    #[serde(serialize_with = "serialize_chain_map")]
    pub chains: Vec<ChainBalance>,
    pub total_balance: String,
    pub total_usd: String,
    pub total_cny: String,
}

impl AddressAggregate {
    /// Looks up a successful chain entry by display name.
    pub fn chain(&self, name: &str) -> Option<&ChainBalance> {
        self.chains.iter().find(|c| c.chain == name)
    }
}

/// Serializes the chain list as an object keyed by display name, preserving
/// chain-selection order.
fn serialize_chain_map<S>(chains: &[ChainBalance], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(chains.len()))?;
    for entry in chains {
        map.serialize_entry(&entry.chain, entry)?;
    }
    map.end()
}

/// Everything the boundary layer needs from one balance query: per-address
/// rollups in input order, request-level grand totals rounded once from
/// unrounded per-unit contributions, and the quote every conversion used.
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub items: Vec<AddressAggregate>,
    pub total_usd: String,
    pub total_cny: String,
    pub quote: PriceQuote,
}
