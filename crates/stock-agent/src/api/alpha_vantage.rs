//! Alpha Vantage client (`GLOBAL_QUOTE`, `OVERVIEW`, `TIME_SERIES_DAILY`)

use super::{
    Bar, CompanyProfile, MarketDataSource, Period, Quote, SharedRateLimiter, parse_number,
    rate_limiter,
};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage API client
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient").finish_non_exhaustive()
    }
}

impl AlphaVantageClient {
    /// Create a client allowing `rate_limit` requests per minute
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter: rate_limiter(rate_limit),
        })
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        self.rate_limiter.until_ready().await;
        debug!(function, symbol, "Alpha Vantage request");

        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", function),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        check_response(&data)?;
        Ok(data)
    }

    /// Latest price from `GLOBAL_QUOTE`
    pub async fn global_quote(&self, symbol: &str) -> Result<Quote> {
        let data = self.query("GLOBAL_QUOTE", symbol).await?;
        parse_global_quote(symbol, &data)
    }

    /// Company fundamentals from `OVERVIEW`
    pub async fn overview(&self, symbol: &str) -> Result<CompanyProfile> {
        let data = self.query("OVERVIEW", symbol).await?;
        parse_overview(symbol, &data)
    }

    /// Last 100 daily bars, oldest first
    pub async fn daily(&self, symbol: &str) -> Result<Vec<Bar>> {
        let data = self.query("TIME_SERIES_DAILY", symbol).await?;
        parse_daily_series(symbol, &data)
    }
}

/// Error and throttling payloads arrive with HTTP 200
fn check_response(data: &Value) -> Result<()> {
    if let Some(error) = data.get("Error Message").and_then(Value::as_str) {
        return Err(StockError::AlphaVantageError(error.to_string()));
    }
    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(StockError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }
    Ok(())
}

fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn text_field(obj: &Value, key: &str) -> Option<String> {
    field(obj, key)
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        .map(ToString::to_string)
}

fn parse_global_quote(symbol: &str, data: &Value) -> Result<Quote> {
    let price = data
        .get("Global Quote")
        .and_then(|q| field(q, "05. price"))
        .and_then(parse_number)
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("no data found via {PROVIDER}"),
        })?;

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        timestamp: Utc::now(),
        source: PROVIDER.to_string(),
    })
}

fn parse_overview(symbol: &str, data: &Value) -> Result<CompanyProfile> {
    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    let number = |key: &str| field(data, key).and_then(parse_number);
    Ok(CompanyProfile {
        symbol: symbol.to_string(),
        name: text_field(data, "Name"),
        sector: text_field(data, "Sector"),
        industry: text_field(data, "Industry"),
        market_cap: number("MarketCapitalization"),
        current_price: None,
        week_52_high: number("52WeekHigh"),
        week_52_low: number("52WeekLow"),
        pe_ratio: number("PERatio"),
        dividend_yield: number("DividendYield"),
    })
}

fn parse_daily_series(symbol: &str, data: &Value) -> Result<Vec<Bar>> {
    let series = data
        .get("Time Series (Daily)")
        .and_then(Value::as_object)
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no daily series in response".to_string(),
        })?;

    let mut bars: Vec<Bar> = series
        .iter()
        .filter_map(|(date, values)| {
            let timestamp = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)?
                .and_utc();
            let num = |key: &str| field(values, key).and_then(parse_number);
            Some(Bar {
                timestamp,
                open: num("1. open")?,
                high: num("2. high")?,
                low: num("3. low")?,
                close: num("4. close")?,
                volume: num("5. volume").unwrap_or(0.0) as u64,
            })
        })
        .collect();

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.global_quote(symbol).await
    }

    /// Periods longer than the compact series are left to the fallback
    async fn history(&self, symbol: &str, period: Period) -> Result<Vec<Bar>> {
        if !matches!(
            period,
            Period::OneDay | Period::FiveDays | Period::OneMonth | Period::ThreeMonths
        ) {
            return Err(StockError::Unsupported {
                provider: PROVIDER,
                operation: "history beyond 100 trading days",
            });
        }

        let start = period.start(Utc::now());
        let mut bars = self.daily(symbol).await?;
        bars.retain(|b| b.timestamp >= start);
        Ok(bars)
    }

    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.overview(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_response() {
        assert!(check_response(&json!({"Global Quote": {}})).is_ok());
        assert!(matches!(
            check_response(&json!({"Error Message": "Invalid API call"})),
            Err(StockError::AlphaVantageError(msg)) if msg == "Invalid API call"
        ));
        assert!(matches!(
            check_response(&json!({"Note": "Thank you for using Alpha Vantage!"})),
            Err(StockError::RateLimitExceeded { .. })
        ));
        assert!(matches!(
            check_response(&json!({"Information": "rate limit is 25 requests per day"})),
            Err(StockError::RateLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_parse_global_quote() {
        let data = json!({
            "Global Quote": {
                "01. symbol": "IBM",
                "05. price": "231.4500",
                "07. latest trading day": "2025-01-10"
            }
        });
        let quote = parse_global_quote("IBM", &data).unwrap();
        assert!((quote.price - 231.45).abs() < 1e-9);
        assert_eq!(quote.source, "Alpha Vantage");

        let err = parse_global_quote("ZZZZ", &json!({"Global Quote": {}})).unwrap_err();
        assert!(matches!(err, StockError::DataUnavailable { .. }));
    }

    #[test]
    fn test_parse_overview() {
        let data = json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "Sector": "TECHNOLOGY",
            "Industry": "ELECTRONIC COMPUTERS",
            "MarketCapitalization": "3500000000000",
            "PERatio": "35.2",
            "DividendYield": "0.0044",
            "52WeekHigh": "260.1",
            "52WeekLow": "164.08"
        });
        let profile = parse_overview("AAPL", &data).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Apple Inc"));
        assert_eq!(profile.market_cap, Some(3.5e12));
        assert_eq!(profile.dividend_yield, Some(0.0044));
        assert_eq!(profile.week_52_low, Some(164.08));

        let sparse = parse_overview("XYZ", &json!({"Name": "X", "PERatio": "None"})).unwrap();
        assert!(sparse.pe_ratio.is_none());
        assert!(sparse.sector.is_none());

        assert!(matches!(
            parse_overview("NOPE", &json!({})),
            Err(StockError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_parse_daily_series_sorted() {
        let data = json!({
            "Time Series (Daily)": {
                "2025-01-10": {"1. open": "10", "2. high": "12", "3. low": "9", "4. close": "11", "5. volume": "1000"},
                "2025-01-09": {"1. open": "9", "2. high": "10", "3. low": "8", "4. close": "10", "5. volume": "900"},
                "bad-date": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1"}
            }
        });
        let bars = parse_daily_series("IBM", &data).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp < bars[1].timestamp);
        assert_eq!(bars[1].close, 11.0);
        assert_eq!(bars[0].volume, 900);
    }

    #[tokio::test]
    async fn test_long_history_unsupported() {
        let client = AlphaVantageClient::new("test_key", 5, Duration::from_secs(5)).unwrap();
        let err = client.history("AAPL", Period::FiveYears).await.unwrap_err();
        assert!(matches!(err, StockError::Unsupported { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires ALPHA_VANTAGE_API_KEY and network access
    async fn test_live_quote() {
        let key = std::env::var("ALPHA_VANTAGE_API_KEY").unwrap();
        let client = AlphaVantageClient::new(key, 5, Duration::from_secs(30)).unwrap();
        let quote = client.quote("IBM").await.unwrap();
        assert!(quote.price > 0.0);
    }
}
