//! Market data providers
//!
//! Every provider implements [`MarketDataSource`]. [`MarketData`] puts a
//! keyed provider in front of the free Yahoo Finance fallback and caches the
//! results.

pub mod alpha_vantage;
pub mod finnhub;
pub mod market_data;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use finnhub::FinnhubClient;
pub use market_data::MarketData;
pub use yahoo::YahooFinanceClient;

use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Per-minute limiter; zero is treated as one request per minute
pub(crate) fn rate_limiter(per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Latest quote for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    /// Provider that served the quote
    pub source: String,
}

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Company fundamentals; providers fill what they know
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
    pub pe_ratio: Option<f64>,
    /// Fraction, 0.005 means 0.5 %
    pub dividend_yield: Option<f64>,
}

impl CompanyProfile {
    /// Fill fields missing here from `other`
    pub fn merge(mut self, other: CompanyProfile) -> Self {
        self.name = self.name.or(other.name);
        self.sector = self.sector.or(other.sector);
        self.industry = self.industry.or(other.industry);
        self.market_cap = self.market_cap.or(other.market_cap);
        self.current_price = self.current_price.or(other.current_price);
        self.week_52_high = self.week_52_high.or(other.week_52_high);
        self.week_52_low = self.week_52_low.or(other.week_52_low);
        self.pe_ratio = self.pe_ratio.or(other.pe_ratio);
        self.dividend_yield = self.dividend_yield.or(other.dividend_yield);
        self
    }
}

/// History period accepted by the history tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// Every period, shortest first
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    /// Wire name, e.g. `1mo`
    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Start of the window ending at `end`
    pub fn start(self, end: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            Period::OneDay => 1,
            Period::FiveDays => 5,
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1825,
            Period::TenYears => 3650,
            Period::Max => 36500,
            Period::YearToDate => {
                return NaiveDate::from_ymd_opt(end.year(), 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map_or(end, |d| d.and_utc());
            }
        };
        end - Duration::days(days)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| StockError::InvalidPeriod(s.to_string()))
    }
}

/// A source of quotes, daily history and company profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Provider name for logs and output
    fn name(&self) -> &str;

    /// Latest quote
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Daily bars covering `period`, oldest first
    async fn history(&self, symbol: &str, period: Period) -> Result<Vec<Bar>>;

    /// Company fundamentals
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile>;
}

/// Parse a provider number that may be `"None"`, `"-"` or empty
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") || raw == "-" {
        return None;
    }
    raw.parse().ok().filter(|v: &f64| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_parse() {
        assert_eq!("1mo".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!("YTD".parse::<Period>().unwrap(), Period::YearToDate);
        assert!(matches!(
            "2w".parse::<Period>(),
            Err(StockError::InvalidPeriod(p)) if p == "2w"
        ));
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn test_period_start() {
        let end = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(Period::OneMonth.start(end), end - Duration::days(30));
        assert_eq!(
            Period::YearToDate.start(end),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_period_serde_names() {
        assert_eq!(serde_json::to_value(Period::ThreeMonths).unwrap(), "3mo");
        let period: Period = serde_json::from_value(serde_json::json!("5y")).unwrap();
        assert_eq!(period, Period::FiveYears);
    }

    #[test]
    fn test_profile_merge() {
        let primary = CompanyProfile {
            symbol: "AAPL".into(),
            name: Some("Apple Inc".into()),
            ..CompanyProfile::default()
        };
        let fallback = CompanyProfile {
            symbol: "AAPL".into(),
            name: Some("Apple".into()),
            week_52_high: Some(260.1),
            ..CompanyProfile::default()
        };
        let merged = primary.merge(fallback);
        assert_eq!(merged.name.as_deref(), Some("Apple Inc"));
        assert_eq!(merged.week_52_high, Some(260.1));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("28.5"), Some(28.5));
        assert_eq!(parse_number("None"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }
}
