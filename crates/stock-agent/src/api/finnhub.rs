//! Finnhub client (`/quote`, `/stock/profile2`)

use super::{Bar, CompanyProfile, MarketDataSource, Period, Quote, SharedRateLimiter, rate_limiter};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// `/quote` payload; unknown symbols come back as all zeros
#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    /// Current price
    c: f64,
    /// Unix time of the last trade
    #[serde(default)]
    t: i64,
}

/// `/stock/profile2` payload; unknown symbols come back as `{}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinnhubProfile {
    name: Option<String>,
    finnhub_industry: Option<String>,
    /// In millions of the listing currency
    market_capitalization: Option<f64>,
}

/// Finnhub client with rate limiting
#[derive(Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl std::fmt::Debug for FinnhubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinnhubClient").finish_non_exhaustive()
    }
}

impl FinnhubClient {
    /// Create a client allowing `rate_limit` requests per minute (free tier: 60)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter: rate_limiter(rate_limit),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str, symbol: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;
        debug!(path, symbol, "Finnhub request");

        let response = self
            .client
            .get(format!("{BASE_URL}{path}"))
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(StockError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::FinnhubError(format!("HTTP {status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StockError::FinnhubError(format!("Failed to parse response: {e}")))
    }

    /// Latest price from `/quote`
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let raw: FinnhubQuote = self.get("/quote", symbol).await?;
        quote_from(symbol, &raw)
    }

    /// Company name, industry and market cap from `/stock/profile2`
    pub async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let raw: FinnhubProfile = self.get("/stock/profile2", symbol).await?;
        profile_from(symbol, raw)
    }
}

fn quote_from(symbol: &str, raw: &FinnhubQuote) -> Result<Quote> {
    if raw.c <= 0.0 {
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("no data found via {PROVIDER}"),
        });
    }

    Ok(Quote {
        symbol: symbol.to_string(),
        price: raw.c,
        timestamp: DateTime::from_timestamp(raw.t, 0).unwrap_or_else(Utc::now),
        source: PROVIDER.to_string(),
    })
}

fn profile_from(symbol: &str, raw: FinnhubProfile) -> Result<CompanyProfile> {
    if raw.name.is_none() && raw.market_capitalization.is_none() {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    Ok(CompanyProfile {
        symbol: symbol.to_string(),
        name: raw.name.filter(|n| !n.is_empty()),
        industry: raw.finnhub_industry.filter(|i| !i.is_empty()),
        market_cap: raw.market_capitalization.map(|m| m * 1_000_000.0),
        ..CompanyProfile::default()
    })
}

#[async_trait]
impl MarketDataSource for FinnhubClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.get_quote(symbol).await
    }

    /// Daily candles are a paid endpoint
    async fn history(&self, _symbol: &str, _period: Period) -> Result<Vec<Bar>> {
        Err(StockError::Unsupported {
            provider: PROVIDER,
            operation: "price history",
        })
    }

    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.get_profile(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_from() {
        let raw: FinnhubQuote =
            serde_json::from_value(json!({"c": 189.98, "d": 1.2, "t": 1_736_500_000})).unwrap();
        let quote = quote_from("AAPL", &raw).unwrap();
        assert_eq!(quote.price, 189.98);
        assert_eq!(quote.timestamp.timestamp(), 1_736_500_000);

        let zero: FinnhubQuote = serde_json::from_value(json!({"c": 0, "t": 0})).unwrap();
        assert!(matches!(
            quote_from("ZZZZ", &zero),
            Err(StockError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_profile_from() {
        let raw: FinnhubProfile = serde_json::from_value(json!({
            "name": "Apple Inc",
            "finnhubIndustry": "Technology",
            "marketCapitalization": 3_500_000.0,
            "ticker": "AAPL"
        }))
        .unwrap();
        let profile = profile_from("AAPL", raw).unwrap();
        assert_eq!(profile.industry.as_deref(), Some("Technology"));
        assert_eq!(profile.market_cap, Some(3.5e12));

        let empty: FinnhubProfile = serde_json::from_value(json!({})).unwrap();
        assert!(profile_from("NOPE", empty).is_err());
    }

    #[tokio::test]
    async fn test_history_unsupported() {
        let client = FinnhubClient::new("test_key", 60, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.history("AAPL", Period::OneMonth).await,
            Err(StockError::Unsupported { .. })
        ));
    }
}
