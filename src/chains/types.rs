use serde::{Deserialize, Serialize};

/// One record of the bundled chain metadata table, as it appears on disk.
/// Symbolic names may carry mixed case; the registry lowercases them into
/// lookup keys at build time.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainEntry {
    pub id: u64,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub rpc: Option<String>,
    #[serde(default)]
    pub explorer: Option<String>,
}

/// Identity and connection info for one chain. Constructed once when the
/// registry is built and immutable for the rest of the process.
///
/// `rpc_url` absent means the chain cannot serve balance queries; the fetcher
/// fails fast without network I/O. `explorer_url` absent means no explorer
/// link is produced for results on this chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    pub key: String,
    #[serde(skip)]
    pub rpc_url: Option<String>,
    #[serde(skip)]
    pub explorer_url: Option<String>,
}

impl From<ChainEntry> for ChainDescriptor {
    fn from(entry: ChainEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            key: entry.key.to_lowercase(),
            rpc_url: entry.rpc,
            explorer_url: entry.explorer,
        }
    }
}
