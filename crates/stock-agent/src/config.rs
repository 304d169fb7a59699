//! Tunables for the market data layer and agents
//!
//! The environment contract lives in `stock_agent_utils::Settings`; this holds
//! the knobs that are not part of it.

use crate::error::{Result, StockError};
use std::time::Duration;

/// Configuration for market data access and agent execution
#[derive(Debug, Clone)]
pub struct StockConfig {
    /// Cache TTL for quotes
    pub cache_ttl_realtime: Duration,

    /// Cache TTL for company profiles
    pub cache_ttl_fundamental: Duration,

    /// Cache TTL for price history
    pub cache_ttl_history: Duration,

    /// Entries each cache keeps before evicting the least recently used
    pub cache_capacity: usize,

    /// HTTP timeout for market data and LLM requests
    pub request_timeout: Duration,

    /// Alpha Vantage requests per minute (free tier: 5)
    pub alpha_vantage_rate_limit: u32,

    /// Finnhub requests per minute (free tier: 60)
    pub finnhub_rate_limit: u32,

    /// Max tokens per completion
    pub max_tokens: usize,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            cache_ttl_realtime: Duration::from_secs(60),
            cache_ttl_fundamental: Duration::from_secs(3600),
            cache_ttl_history: Duration::from_secs(300),
            cache_capacity: 256,
            request_timeout: Duration::from_secs(30),
            alpha_vantage_rate_limit: 5,
            finnhub_rate_limit: 60,
            max_tokens: 2048,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_rate_limit == 0 || self.finnhub_rate_limit == 0 {
            return Err(StockError::ConfigError(
                "rate limits must be greater than 0".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(StockError::ConfigError(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(StockError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    cache_ttl_realtime: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    cache_ttl_history: Option<Duration>,
    cache_capacity: Option<usize>,
    request_timeout: Option<Duration>,
    alpha_vantage_rate_limit: Option<u32>,
    finnhub_rate_limit: Option<u32>,
    max_tokens: Option<usize>,
}

impl StockConfigBuilder {
    /// Set cache TTL for quotes
    pub fn cache_ttl_realtime(mut self, duration: Duration) -> Self {
        self.cache_ttl_realtime = Some(duration);
        self
    }

    /// Set cache TTL for company profiles
    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    /// Set cache TTL for price history
    pub fn cache_ttl_history(mut self, duration: Duration) -> Self {
        self.cache_ttl_history = Some(duration);
        self
    }

    /// Set the per-cache entry limit
    pub fn cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = Some(entries);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set Finnhub requests per minute
    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            cache_ttl_realtime: self.cache_ttl_realtime.unwrap_or(defaults.cache_ttl_realtime),
            cache_ttl_fundamental: self
                .cache_ttl_fundamental
                .unwrap_or(defaults.cache_ttl_fundamental),
            cache_ttl_history: self.cache_ttl_history.unwrap_or(defaults.cache_ttl_history),
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        };

        config.validate()?;
        Ok(config)
    }
}
