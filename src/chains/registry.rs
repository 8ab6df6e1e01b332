use std::collections::HashMap;

use crate::chains::types::{ChainDescriptor, ChainEntry};

/// Chain metadata bundled into the binary, read once at startup.
const BUNDLED_CHAINS: &str = include_str!("chains.json");

/// Holds the canonical, deduplicated set of queryable chains and answers
/// lookup, search, and pagination queries. Built once; read-only afterwards.
pub struct ChainRegistry {
    /// Every entry from the metadata source, aliases included.
    raw: Vec<ChainDescriptor>,
    /// Deduplicated set, in first-seen order of each chain id.
    canonical: Vec<ChainDescriptor>,
}

impl ChainRegistry {
    /// Build the registry from the bundled chain metadata table.
    pub fn bundled() -> eyre::Result<Self> {
        let entries: Vec<ChainEntry> = serde_json::from_str(BUNDLED_CHAINS)
            .map_err(|e| eyre::eyre!("Failed to parse bundled chain metadata: {}", e))?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ChainEntry>) -> Self {
        let raw: Vec<ChainDescriptor> = entries.into_iter().map(ChainDescriptor::from).collect();
        let canonical = dedup_chains(&raw);

        tracing::debug!(
            total = raw.len(),
            canonical = canonical.len(),
            "Chain registry built"
        );

        Self { raw, canonical }
    }

    /// The canonical, deduplicated chain set in registry build order.
    pub fn all(&self) -> &[ChainDescriptor] {
        &self.canonical
    }

    /// Case-insensitive substring search against display name or key.
    /// An empty or absent keyword returns the full canonical list.
    pub fn find_by_keyword(&self, keyword: Option<&str>) -> Vec<ChainDescriptor> {
        let needle = match keyword {
            Some(k) if !k.trim().is_empty() => k.trim().to_lowercase(),
            _ => return self.canonical.clone(),
        };

        self.canonical
            .iter()
            .filter(|chain| {
                chain.name.to_lowercase().contains(&needle) || chain.key.contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Contiguous `[offset, offset + limit)` slice of a chain list. Negative
    /// or missing values fall back to `offset = 0, limit = 10`; an offset past
    /// the end yields an empty slice. `limit` is not clamped upward.
    pub fn paginate(chains: &[ChainDescriptor], offset: Option<i64>, limit: Option<i64>) -> &[ChainDescriptor] {
        let offset = offset.filter(|v| *v >= 0).unwrap_or(0) as usize;
        let limit = limit.filter(|v| *v >= 0).unwrap_or(10) as usize;

        let start = offset.min(chains.len());
        let end = start.saturating_add(limit).min(chains.len());
        &chains[start..end]
    }

    /// Case-insensitive key lookup against the raw, pre-dedup entry list, so
    /// an alias that lost its dedup tie-break stays individually resolvable
    /// even though it is absent from `all()`.
    pub fn resolve(&self, key: &str) -> Option<&ChainDescriptor> {
        let key = key.trim().to_lowercase();
        self.raw.iter().find(|chain| chain.key == key)
    }
}

/// Collapse aliases sharing a chain id. Metadata sources commonly register the
/// same network under several symbolic names; the shortest key is by
/// convention the primary alias, so it wins, with ties kept on the first
/// entry seen. Output order is the first-seen order of each id.
fn dedup_chains(raw: &[ChainDescriptor]) -> Vec<ChainDescriptor> {
    let mut slot_by_id: HashMap<u64, usize> = HashMap::new();
    let mut canonical: Vec<ChainDescriptor> = Vec::new();

    for chain in raw {
        match slot_by_id.get(&chain.id) {
            Some(&slot) => {
                if chain.key.len() < canonical[slot].key.len() {
                    canonical[slot] = chain.clone();
                }
            }
            None => {
                slot_by_id.insert(chain.id, canonical.len());
                canonical.push(chain.clone());
            }
        }
    }

    canonical
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, name: &str, key: &str) -> ChainEntry {
        ChainEntry {
            id,
            name: name.to_string(),
            key: key.to_string(),
            rpc: Some(format!("https://rpc.{}.example", key.to_lowercase())),
            explorer: None,
        }
    }

    #[test]
    fn test_dedup_keeps_shortest_key() {
        let registry = ChainRegistry::from_entries(vec![
            entry(1, "Ethereum", "ethereum"),
            entry(1, "Ethereum", "eth"),
            entry(137, "Polygon", "polygon"),
        ]);

        let keys: Vec<&str> = registry.all().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["eth", "polygon"]);
    }

    #[test]
    fn test_dedup_tie_keeps_first_seen() {
        let registry = ChainRegistry::from_entries(vec![
            entry(31337, "Foundry", "foundry"),
            entry(31337, "Hardhat", "hardhat"),
        ]);

        assert_eq!(registry.all().len(), 1);
        assert_eq!(registry.all()[0].key, "foundry");
    }

    #[test]
    fn test_resolve_bypasses_dedup() {
        let registry = ChainRegistry::from_entries(vec![
            entry(1, "Ethereum", "eth"),
            entry(1, "Ethereum", "ethereum"),
        ]);

        // "ethereum" lost the tie-break but stays resolvable by its own key.
        assert!(registry.all().iter().all(|c| c.key != "ethereum"));
        assert_eq!(registry.resolve("ethereum").unwrap().id, 1);
        assert_eq!(registry.resolve("ETHEREUM").unwrap().id, 1);
        assert!(registry.resolve("dogecoin").is_none());
    }

    #[test]
    fn test_keys_lowercased_at_build() {
        let registry = ChainRegistry::from_entries(vec![entry(42161, "Arbitrum One", "arbitrumOne")]);

        assert_eq!(registry.all()[0].key, "arbitrumone");
        assert!(registry.resolve("arbitrumOne").is_some());
    }

    #[test]
    fn test_find_by_keyword_matches_name_or_key() {
        let registry = ChainRegistry::from_entries(vec![
            entry(42161, "Arbitrum One", "arbitrum"),
            entry(8453, "Base", "base"),
        ]);

        let hits = registry.find_by_keyword(Some("arb"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "arbitrum");

        // Substring of the display name also matches.
        let hits = registry.find_by_keyword(Some("one"));
        assert_eq!(hits.len(), 1);

        assert!(registry.find_by_keyword(Some("solana")).is_empty());
    }

    #[test]
    fn test_find_by_keyword_empty_returns_all() {
        let registry = ChainRegistry::from_entries(vec![
            entry(1, "Ethereum", "eth"),
            entry(137, "Polygon", "polygon"),
        ]);

        assert_eq!(registry.find_by_keyword(None).len(), 2);
        assert_eq!(registry.find_by_keyword(Some("")).len(), 2);
        assert_eq!(registry.find_by_keyword(Some("  ")).len(), 2);
    }

    #[test]
    fn test_paginate_slices_and_defaults() {
        let registry = ChainRegistry::from_entries(vec![
            entry(1, "Ethereum", "eth"),
            entry(10, "OP Mainnet", "optimism"),
            entry(137, "Polygon", "polygon"),
        ]);
        let chains = registry.all();

        assert_eq!(ChainRegistry::paginate(chains, Some(1), Some(1)).len(), 1);
        assert_eq!(ChainRegistry::paginate(chains, Some(1), Some(1))[0].key, "optimism");

        // Offset past the end yields an empty slice, not an error.
        assert!(ChainRegistry::paginate(chains, Some(5), Some(10)).is_empty());

        // Missing or negative values fall back to offset 0, limit 10.
        assert_eq!(ChainRegistry::paginate(chains, None, None).len(), 3);
        assert_eq!(ChainRegistry::paginate(chains, Some(-3), Some(-1)).len(), 3);

        // Limit zero is honored as-is.
        assert!(ChainRegistry::paginate(chains, Some(0), Some(0)).is_empty());
    }

    #[test]
    fn test_bundled_metadata_parses_with_unique_canonical_ids() {
        let registry = ChainRegistry::bundled().unwrap();
        assert!(!registry.all().is_empty());

        let mut ids: Vec<u64> = registry.all().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), registry.all().len());

        // The bundled table carries aliases, so raw lookup must cover keys
        // that are not in the canonical set.
        assert!(registry.resolve("arbitrumone").is_some());
        assert!(registry.all().iter().all(|c| c.key != "arbitrumone"));
    }
}
