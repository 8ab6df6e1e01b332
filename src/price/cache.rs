use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::price::source::PriceSource;

/// A fiat conversion snapshot. `fetched_at_ms == 0` marks the never-fetched
/// sentinel, which must stay distinguishable from a legitimately zero-priced
/// coin.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub usd: f64,
    pub cny: f64,
    #[serde(skip)]
    pub fetched_at_ms: i64,
}

impl PriceQuote {
    fn never_fetched() -> Self {
        Self {
            usd: 0.0,
            cny: 0.0,
            fetched_at_ms: 0,
        }
    }
}

/// Process-wide price cache with a freshness window. The quote is replaced as
/// a whole under the write lock, so readers never observe one currency from an
/// old fetch and the other from a new one. The refresh mutex keeps concurrent
/// stale readers down to a single in-flight feed call.
pub struct PriceCache {
    source: Box<dyn PriceSource>,
    ttl_ms: i64,
    quote: RwLock<PriceQuote>,
    refresh: Mutex<()>,
}

impl PriceCache {
    pub fn new(source: Box<dyn PriceSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl_ms: ttl.as_millis() as i64,
            quote: RwLock::new(PriceQuote::never_fetched()),
            refresh: Mutex::new(()),
        }
    }

    /// Returns the current quote, refreshing from the feed first when the
    /// freshness window has elapsed. Feed failures never surface to the
    /// caller: with a prior successful fetch the stale quote keeps serving
    /// indefinitely; without one, the zero sentinel is installed stamped
    /// "now" so repeated failures back off on the normal window instead of
    /// retrying on every call.
    pub async fn get_quote(&self) -> PriceQuote {
        if let Some(quote) = self.fresh_quote().await {
            return quote;
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have finished the refresh while we waited.
        if let Some(quote) = self.fresh_quote().await {
            return quote;
        }

        let now = Utc::now().timestamp_millis();
        match self.source.fetch().await {
            Ok(price) => {
                let refreshed = PriceQuote {
                    usd: price.usd,
                    cny: price.cny,
                    fetched_at_ms: now,
                };
                *self.quote.write().await = refreshed.clone();
                tracing::debug!(usd = price.usd, cny = price.cny, "Price quote refreshed");
                refreshed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Price feed refresh failed");
                let mut quote = self.quote.write().await;
                if quote.fetched_at_ms == 0 {
                    *quote = PriceQuote {
                        usd: 0.0,
                        cny: 0.0,
                        fetched_at_ms: now,
                    };
                }
                quote.clone()
            }
        }
    }

    async fn fresh_quote(&self) -> Option<PriceQuote> {
        let quote = self.quote.read().await;
        let now = Utc::now().timestamp_millis();
        if quote.fetched_at_ms != 0 && now - quote.fetched_at_ms < self.ttl_ms {
            Some(quote.clone())
        } else {
            None
        }
    }

    #[cfg(test)]
    async fn rewind_fetched_at(&self, by_ms: i64) {
        self.quote.write().await.fetched_at_ms -= by_ms;
    }
}
