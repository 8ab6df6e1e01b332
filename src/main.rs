use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use coinscope::api::{self, AppState};
use coinscope::balances::aggregator::BalanceAggregator;
use coinscope::balances::fetcher::RpcBalanceFetcher;
use coinscope::chains::registry::ChainRegistry;
use coinscope::config::Config;
use coinscope::price::cache::PriceCache;
use coinscope::price::source::CoingeckoSource;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("Coinscope starting");

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!("Configuration loaded from {}", config_path);

    // Build the canonical chain registry from the bundled metadata table
    let registry = Arc::new(ChainRegistry::bundled()?);
    tracing::info!(chains = registry.all().len(), "Chain registry built");

    // Price cache, shared by every request
    let source = CoingeckoSource::new(
        config.price.feed_url.clone(),
        Duration::from_millis(config.price.feed_timeout_ms),
    )?;
    let price_cache = Arc::new(PriceCache::new(
        Box::new(source),
        Duration::from_secs(config.price.cache_ttl_secs),
    ));

    let fetcher = Arc::new(RpcBalanceFetcher::new(Duration::from_millis(
        config.rpc.request_timeout_ms,
    )));
    let aggregator = Arc::new(BalanceAggregator::new(
        registry.clone(),
        price_cache,
        fetcher,
    ));

    let state = AppState {
        registry,
        aggregator,
        max_addresses: config.api.max_addresses,
    };

    api::serve(state, &config.api.host, config.api.port).await?;

    tracing::info!("Coinscope stopped gracefully");
    Ok(())
}
