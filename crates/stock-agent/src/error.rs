//! Error types for market data and agent operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown history period
    #[error("Invalid period: {0} (expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)")]
    InvalidPeriod(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Provider does not offer this operation
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Finnhub API error
    #[error("Finnhub error: {0}")]
    FinnhubError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Invalid or incomplete settings
    #[error(transparent)]
    Settings(#[from] stock_agent_utils::ConfigError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// LLM provider could not be created
    #[error("LLM error: {0}")]
    Llm(#[from] stock_agent_llm::LLMError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<StockError> for stock_agent_core::Error {
    fn from(err: StockError) -> Self {
        stock_agent_core::Error::ProcessingFailed(err.to_string())
    }
}

impl From<stock_agent_core::Error> for StockError {
    fn from(err: stock_agent_core::Error) -> Self {
        StockError::Other(err.to_string())
    }
}
