use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Spot price of the native coin in the fiat currencies the API reports.
#[derive(Debug, Clone, Copy)]
pub struct SpotPrice {
    pub usd: f64,
    pub cny: f64,
}

/// External spot-price feed. Any transport error or response missing the
/// expected fields is a fetch failure; the cache decides what to serve then.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> eyre::Result<SpotPrice>;
}

/// CoinGecko simple-price feed.
pub struct CoingeckoSource {
    client: reqwest::Client,
    url: String,
}

impl CoingeckoSource {
    pub fn new(url: String, timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre::eyre!("Failed to build price feed client: {}", e))?;

        Ok(Self { client, url })
    }
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    ethereum: CoinPrices,
}

#[derive(Debug, Deserialize)]
struct CoinPrices {
    usd: f64,
    cny: f64,
}

#[async_trait]
impl PriceSource for CoingeckoSource {
    async fn fetch(&self) -> eyre::Result<SpotPrice> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let parsed: SimplePriceResponse = response.json().await?;

        Ok(SpotPrice {
            usd: parsed.ethereum.usd,
            cny: parsed.ethereum.cny,
        })
    }
}
