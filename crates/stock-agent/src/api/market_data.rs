//! Keyed provider in front of the Yahoo Finance fallback, with caching

use super::{
    AlphaVantageClient, Bar, CompanyProfile, FinnhubClient, MarketDataSource, Period, Quote,
    YahooFinanceClient,
};
use crate::cache::{CacheKey, MarketCache};
use crate::config::StockConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use stock_agent_utils::{MarketDataProvider, Settings};
use tracing::{debug, warn};

/// Market data with primary/fallback routing
///
/// Every request goes to the primary provider first when one is configured.
/// Failures (including unsupported operations) are logged and retried
/// against the fallback. Profiles from both sources are merged so the keyed
/// provider's fundamentals sit next to Yahoo's price-derived fields.
#[derive(Clone)]
pub struct MarketData {
    primary: Option<Arc<dyn MarketDataSource>>,
    fallback: Arc<dyn MarketDataSource>,
    cache: MarketCache,
}

impl std::fmt::Debug for MarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketData")
            .field("primary", &self.primary.as_ref().map(|p| p.name().to_string()))
            .field("fallback", &self.fallback.name())
            .finish_non_exhaustive()
    }
}

impl MarketData {
    /// Compose sources explicitly
    pub fn new(
        primary: Option<Arc<dyn MarketDataSource>>,
        fallback: Arc<dyn MarketDataSource>,
        cache: MarketCache,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache,
        }
    }

    /// Pick the primary provider from the configured keys
    pub fn from_settings(settings: &Settings, config: &StockConfig) -> Result<Self> {
        let primary: Option<Arc<dyn MarketDataSource>> = match (
            settings.market_data_provider(),
            settings.stock_api_key(),
        ) {
            (MarketDataProvider::AlphaVantage, Some(key)) => Some(Arc::new(
                AlphaVantageClient::new(key, config.alpha_vantage_rate_limit, config.request_timeout)?,
            )),
            (MarketDataProvider::Finnhub, Some(key)) => Some(Arc::new(FinnhubClient::new(
                key,
                config.finnhub_rate_limit,
                config.request_timeout,
            )?)),
            _ => None,
        };

        debug!(
            primary = primary.as_ref().map(|p| p.name().to_string()),
            "Market data sources configured"
        );

        Ok(Self::new(
            primary,
            Arc::new(YahooFinanceClient::new()),
            MarketCache::new(config),
        ))
    }

    /// The keyed provider, if any
    pub fn primary(&self) -> Option<&Arc<dyn MarketDataSource>> {
        self.primary.as_ref()
    }

    /// The caches behind this source
    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    async fn with_fallback<T, F, Fut>(&self, operation: &str, symbol: &str, call: F) -> Result<T>
    where
        F: Fn(Arc<dyn MarketDataSource>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(primary) = &self.primary {
            match call(Arc::clone(primary)).await {
                Ok(value) => return Ok(value),
                Err(e) => warn!(
                    provider = primary.name(),
                    operation,
                    symbol,
                    error = %e,
                    "Primary provider failed, using fallback"
                ),
            }
        }
        call(Arc::clone(&self.fallback)).await
    }
}

fn to_cached<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn from_cached<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl MarketDataSource for MarketData {
    fn name(&self) -> &str {
        self.primary
            .as_ref()
            .map_or_else(|| self.fallback.name(), |p| p.name())
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = symbol.to_uppercase();
        let key = CacheKey::new(&symbol, "quote", "");
        let value = self
            .cache
            .realtime
            .get_or_fetch(key, || async {
                let quote = self
                    .with_fallback("quote", &symbol, |source| {
                        let symbol = symbol.clone();
                        async move { source.quote(&symbol).await }
                    })
                    .await?;
                to_cached(&quote)
            })
            .await?;
        from_cached(value)
    }

    async fn history(&self, symbol: &str, period: Period) -> Result<Vec<Bar>> {
        let symbol = symbol.to_uppercase();
        let key = CacheKey::new(&symbol, "history", period.as_str());
        let value = self
            .cache
            .history
            .get_or_fetch(key, || async {
                let bars = self
                    .with_fallback("history", &symbol, |source| {
                        let symbol = symbol.clone();
                        async move { source.history(&symbol, period).await }
                    })
                    .await?;
                to_cached(&bars)
            })
            .await?;
        from_cached(value)
    }

    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let symbol = symbol.to_uppercase();
        let key = CacheKey::new(&symbol, "profile", "");
        let value = self
            .cache
            .fundamental
            .get_or_fetch(key, || async {
                let primary = match &self.primary {
                    Some(primary) => match primary.profile(&symbol).await {
                        Ok(profile) => Some(profile),
                        Err(e) => {
                            warn!(provider = primary.name(), symbol = %symbol, error = %e, "Primary profile failed");
                            None
                        }
                    },
                    None => None,
                };

                let profile = match (primary, self.fallback.profile(&symbol).await) {
                    (Some(p), Ok(f)) => p.merge(f),
                    (Some(p), Err(e)) => {
                        debug!(symbol = %symbol, error = %e, "Fallback profile unavailable");
                        p
                    }
                    (None, fallback) => fallback?,
                };
                to_cached(&profile)
            })
            .await?;
        from_cached(value)
    }
}
