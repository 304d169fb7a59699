//! Yahoo Finance client, the keyless fallback provider

use super::{Bar, CompanyProfile, MarketDataSource, Period, Quote};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| StockError::YahooFinanceError(e.to_string()))
    }

    /// Daily bars between `start` and `end`
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = Self::connector()?
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        debug!(symbol, bars = quotes.len(), "Fetched Yahoo history");
        Ok(quotes
            .iter()
            .map(|q| Bar {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or(end),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}

/// 52-week range and last close from a year of bars
pub(crate) fn profile_from_year(symbol: &str, bars: &[Bar]) -> CompanyProfile {
    let high = bars.iter().map(|b| b.high).fold(f64::NAN, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::NAN, f64::min);

    CompanyProfile {
        symbol: symbol.to_string(),
        current_price: bars.last().map(|b| b.close),
        week_52_high: Some(high).filter(|v| v.is_finite()),
        week_52_low: Some(low).filter(|v| v.is_finite()),
        ..CompanyProfile::default()
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let response = Self::connector()?
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(Quote {
            symbol: symbol.to_string(),
            price: quote.close,
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
            source: PROVIDER.to_string(),
        })
    }

    async fn history(&self, symbol: &str, period: Period) -> Result<Vec<Bar>> {
        let end = Utc::now();
        self.get_historical_quotes(symbol, period.start(end), end)
            .await
    }

    /// Only price-derived fields; the chart API has no company metadata
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let bars = self.history(symbol, Period::OneYear).await?;
        if bars.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no price history".to_string(),
            });
        }
        Ok(profile_from_year(symbol, &bars))
    }
}
