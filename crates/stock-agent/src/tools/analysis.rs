//! Report calculations behind the stock tools
//!
//! Everything here is pure: the tools fetch bars and profiles, these
//! functions turn them into the text the model reads.

use crate::api::{Bar, CompanyProfile};
use crate::error::{Result, StockError};
use std::fmt;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Short moving-average window
pub const SHORT_WINDOW: usize = 20;
/// Long moving-average window
pub const LONG_WINDOW: usize = 50;
/// Bars considered for support and resistance
pub const LEVELS_WINDOW: usize = 20;

const NOT_AVAILABLE: &str = "N/A";

/// Summary of a price history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub latest_close: f64,
    pub latest_volume: u64,
    pub period_high: f64,
    pub period_low: f64,
    pub price_change: f64,
    /// `None` when the first close is zero
    pub percent_change: Option<f64>,
}

/// Summarize bars ordered oldest first; `None` for an empty series
pub fn summarize_history(bars: &[Bar]) -> Option<HistorySummary> {
    let first = bars.first()?;
    let last = bars.last()?;

    let period_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let period_low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let price_change = last.close - first.close;
    let percent_change = (first.close != 0.0).then(|| price_change / first.close * 100.0);

    Some(HistorySummary {
        latest_close: last.close,
        latest_volume: last.volume,
        period_high,
        period_low,
        price_change,
        percent_change,
    })
}

impl HistorySummary {
    /// Tool output for `get_stock_history`
    pub fn render(&self, symbol: &str, period: &str) -> String {
        format!(
            "Historical data for {symbol} ({period}):\n\
             Latest Close: ${:.2}\n\
             Latest Volume: {}\n\
             Period High: ${:.2}\n\
             Period Low: ${:.2}\n\
             Price Change: ${:.2}\n\
             Percent Change: {}",
            self.latest_close,
            group_thousands(self.latest_volume),
            self.period_high,
            self.period_low,
            self.price_change,
            self.percent_change
                .map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("{p:.2}%")),
        )
    }
}

/// Direction implied by price and the two moving averages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Price above MA20, MA20 above MA50
    Bullish,
    /// Price below MA20, MA20 below MA50
    Bearish,
    MixedNeutral,
}

impl Trend {
    /// Classify; a missing average is always mixed
    pub fn classify(price: f64, short: Option<f64>, long: Option<f64>) -> Self {
        match (short, long) {
            (Some(short), Some(long)) if price > short && short > long => Trend::Bullish,
            (Some(short), Some(long)) if price < short && short < long => Trend::Bearish,
            _ => Trend::MixedNeutral,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Bullish => "Bullish (Price above 20MA, 20MA above 50MA)",
            Trend::Bearish => "Bearish (Price below 20MA, 20MA below 50MA)",
            Trend::MixedNeutral => "Mixed/Neutral",
        })
    }
}

/// Basic technical picture of a price series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalSnapshot {
    pub current_price: f64,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub trend: Trend,
    /// Sample standard deviation of daily percent changes, in percent
    pub volatility: Option<f64>,
    pub support: f64,
    pub resistance: f64,
}

/// Analyze bars ordered oldest first; `None` for an empty series
pub fn technical_snapshot(bars: &[Bar]) -> Result<Option<TechnicalSnapshot>> {
    let Some(last) = bars.last() else {
        return Ok(None);
    };

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ma20 = moving_average(&closes, SHORT_WINDOW)?;
    let ma50 = moving_average(&closes, LONG_WINDOW)?;

    let recent = &bars[bars.len().saturating_sub(LEVELS_WINDOW)..];
    let support = recent.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let resistance = recent.iter().map(|b| b.high).fold(f64::MIN, f64::max);

    Ok(Some(TechnicalSnapshot {
        current_price: last.close,
        ma20,
        ma50,
        trend: Trend::classify(last.close, ma20, ma50),
        volatility: volatility(&closes),
        support,
        resistance,
    }))
}

impl TechnicalSnapshot {
    /// Tool output for `analyze_stock`
    pub fn render(&self, symbol: &str) -> String {
        format!(
            "Technical Analysis for {symbol}:\n\
             Current Price: ${:.2}\n\
             20-day MA: {}\n\
             50-day MA: {}\n\
             Trend: {}\n\
             Volatility (3-month): {}\n\
             Recent Support: ${:.2}\n\
             Recent Resistance: ${:.2}",
            self.current_price,
            dollars(self.ma20),
            dollars(self.ma50),
            self.trend,
            self.volatility
                .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}%")),
            self.support,
            self.resistance,
        )
    }
}

/// Simple moving average of the last `window` closes, `None` with fewer
pub fn moving_average(closes: &[f64], window: usize) -> Result<Option<f64>> {
    if closes.len() < window {
        return Ok(None);
    }
    let mut sma =
        SimpleMovingAverage::new(window).map_err(|e| StockError::IndicatorError(e.to_string()))?;
    Ok(closes.iter().map(|&c| sma.next(c)).last())
}

/// Sample standard deviation of daily percent changes (x100)
///
/// Needs at least two changes, i.e. three closes.
pub fn volatility(closes: &[f64]) -> Option<f64> {
    let changes: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if changes.len() < 2 {
        return None;
    }

    let n = changes.len() as f64;
    let mean = changes.iter().sum::<f64>() / n;
    let variance = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt() * 100.0)
}

/// Tool output for `get_stock_info`
pub fn render_profile(symbol: &str, profile: &CompanyProfile) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let rows = [
        ("Company Name", text(&profile.name)),
        ("Sector", text(&profile.sector)),
        ("Industry", text(&profile.industry)),
        ("Market Cap", format_market_cap(profile.market_cap)),
        ("Current Price", dollars(profile.current_price)),
        ("52 Week High", dollars(profile.week_52_high)),
        ("52 Week Low", dollars(profile.week_52_low)),
        (
            "P/E Ratio",
            profile
                .pe_ratio
                .map_or_else(|| NOT_AVAILABLE.to_string(), |pe| format!("{pe:.2}")),
        ),
        (
            "Dividend Yield",
            profile
                .dividend_yield
                .filter(|y| *y > 0.0)
                .map_or_else(|| NOT_AVAILABLE.to_string(), |y| format!("{:.2}%", y * 100.0)),
        ),
    ];

    let mut out = format!("Information for {symbol}:\n");
    for (label, value) in rows {
        out.push_str(&format!("{label}: {value}\n"));
    }
    out
}

/// `$1,234,567`, `N/A` when absent or non-positive
pub fn format_market_cap(market_cap: Option<f64>) -> String {
    match market_cap {
        Some(cap) if cap > 0.0 => format!("${}", group_thousands(cap.round() as u64)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn dollars(value: Option<f64>) -> String {
    value
        .filter(|v| *v > 0.0)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("${v:.2}"))
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
