//! Shared utilities for the stock analysis agents
//!
//! The environment contract ([`Settings`], [`ENV_KEYS`]), the `env_example.txt`
//! template and its documentation check, and tracing setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod template;

pub use config::{ENV_KEYS, EnvKey, MarketDataProvider, Settings};
pub use error::{ConfigError, TemplateError};
pub use logging::init_tracing;
pub use template::{DocIssue, EnvTemplate, render_template};
