//! Environment contract for the stock analysis agents
//!
//! Every tunable is read once at startup from the process environment, falling
//! back to a local `.env` file, falling back to the defaults in [`ENV_KEYS`].
//! The `.env` file is read without touching the process environment.

use crate::ConfigError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Environment variable names
pub mod keys {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const OPENAI_API_BASE: &str = "OPENAI_API_BASE";
    pub const ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
    pub const FINNHUB_API_KEY: &str = "FINNHUB_API_KEY";
    pub const MASTER_AGENT_TEMPERATURE: &str = "MASTER_AGENT_TEMPERATURE";
    pub const JUNIOR_AGENT_TEMPERATURE: &str = "JUNIOR_AGENT_TEMPERATURE";
    pub const ORCHESTRATOR_AGENT_TEMPERATURE: &str = "ORCHESTRATOR_AGENT_TEMPERATURE";
    pub const MAX_ITERATIONS: &str = "MAX_ITERATIONS";
    pub const VERBOSE: &str = "VERBOSE";
}

/// One entry of the environment contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvKey {
    /// Variable name
    pub name: &'static str,
    /// One-line documentation, rendered as a template comment
    pub description: &'static str,
    /// Default applied when unset
    pub default: Option<&'static str>,
    /// Startup fails without it
    pub required: bool,
    /// Value is masked in summaries
    pub secret: bool,
}

/// The complete environment contract, in template order
pub const ENV_KEYS: &[EnvKey] = &[
    EnvKey {
        name: keys::OPENAI_API_KEY,
        description: "OpenAI API key used by all three agents (required)",
        default: None,
        required: true,
        secret: true,
    },
    EnvKey {
        name: keys::OPENAI_MODEL,
        description: "Chat model used by every agent",
        default: Some("gpt-4"),
        required: false,
        secret: false,
    },
    EnvKey {
        name: keys::OPENAI_API_BASE,
        description: "Base URL for OpenAI-compatible endpoints",
        default: Some("https://api.openai.com/v1"),
        required: false,
        secret: false,
    },
    EnvKey {
        name: keys::ALPHA_VANTAGE_API_KEY,
        description: "Alpha Vantage key (optional, preferred market data source)",
        default: None,
        required: false,
        secret: true,
    },
    EnvKey {
        name: keys::FINNHUB_API_KEY,
        description: "Finnhub key (optional, used when no Alpha Vantage key is set)",
        default: None,
        required: false,
        secret: true,
    },
    EnvKey {
        name: keys::MASTER_AGENT_TEMPERATURE,
        description: "Master agent sampling temperature, 0.0 to 1.0",
        default: Some("0.7"),
        required: false,
        secret: false,
    },
    EnvKey {
        name: keys::JUNIOR_AGENT_TEMPERATURE,
        description: "Junior agent sampling temperature, 0.0 to 1.0",
        default: Some("0.5"),
        required: false,
        secret: false,
    },
    EnvKey {
        name: keys::ORCHESTRATOR_AGENT_TEMPERATURE,
        description: "Orchestrator agent sampling temperature, 0.0 to 1.0",
        default: Some("0.3"),
        required: false,
        secret: false,
    },
    EnvKey {
        name: keys::MAX_ITERATIONS,
        description: "Maximum model/tool turns per agent run",
        default: Some("10"),
        required: false,
        secret: false,
    },
    EnvKey {
        name: keys::VERBOSE,
        description: "Verbose logging, True or False",
        default: Some("True"),
        required: false,
        secret: false,
    },
];

/// Look up a contract entry by name
pub fn env_key(name: &str) -> Option<&'static EnvKey> {
    ENV_KEYS.iter().find(|k| k.name == name)
}

/// Which market data provider the configured key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketDataProvider {
    AlphaVantage,
    Finnhub,
    /// No key configured
    Yahoo,
}

impl std::fmt::Display for MarketDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::AlphaVantage => "Alpha Vantage",
            Self::Finnhub => "Finnhub",
            Self::Yahoo => "Yahoo Finance",
        })
    }
}

/// Typed view of the environment contract
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    pub alpha_vantage_api_key: Option<String>,
    pub finnhub_api_key: Option<String>,
    pub master_temperature: f32,
    pub junior_temperature: f32,
    pub orchestrator_temperature: f32,
    pub max_iterations: usize,
    pub verbose: bool,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Settings");
        for (key, value) in self.redacted_summary() {
            s.field(key, &value);
        }
        s.finish()
    }
}

impl Settings {
    /// Build settings from any key lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                env_key(key)
                    .and_then(|k| k.default)
                    .unwrap_or_default()
                    .to_string()
            })
        };

        Ok(Self {
            openai_api_key: get(keys::OPENAI_API_KEY),
            openai_model: or_default(keys::OPENAI_MODEL),
            openai_api_base: or_default(keys::OPENAI_API_BASE),
            alpha_vantage_api_key: get(keys::ALPHA_VANTAGE_API_KEY),
            finnhub_api_key: get(keys::FINNHUB_API_KEY),
            master_temperature: parse_temperature(
                keys::MASTER_AGENT_TEMPERATURE,
                &or_default(keys::MASTER_AGENT_TEMPERATURE),
            )?,
            junior_temperature: parse_temperature(
                keys::JUNIOR_AGENT_TEMPERATURE,
                &or_default(keys::JUNIOR_AGENT_TEMPERATURE),
            )?,
            orchestrator_temperature: parse_temperature(
                keys::ORCHESTRATOR_AGENT_TEMPERATURE,
                &or_default(keys::ORCHESTRATOR_AGENT_TEMPERATURE),
            )?,
            max_iterations: parse_max_iterations(&or_default(keys::MAX_ITERATIONS))?,
            verbose: or_default(keys::VERBOSE).trim().eq_ignore_ascii_case("true"),
        })
    }

    /// Settings from the process environment only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Process environment layered over `.env` in the working directory
    ///
    /// A missing `.env` is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match dotenvy::from_filename_iter(".env") {
            Ok(iter) => collect_env_file(iter)?,
            Err(e) if e.not_found() => {
                debug!("No .env file found, using process environment only");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Self::layered(|key| std::env::var(key).ok(), &file)
    }

    /// Process environment layered over an explicit env file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = collect_env_file(dotenvy::from_path_iter(path.as_ref())?)?;
        debug!(path = %path.as_ref().display(), keys = file.len(), "Loaded env file");
        Self::layered(|key| std::env::var(key).ok(), &file)
    }

    /// `env` wins over `file`; a blank value in `env` falls through to `file`
    fn layered<F>(env: F, file: &HashMap<String, String>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.get(key).cloned())
        })
    }

    /// Check startup requirements
    ///
    /// A missing market data key is only a warning: Yahoo Finance is used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.is_none() {
            return Err(ConfigError::MissingRequired {
                key: keys::OPENAI_API_KEY,
            });
        }

        if self.stock_api_key().is_none() {
            warn!("No stock API key found. Using Yahoo Finance as fallback.");
        }

        Ok(())
    }

    /// Preferred market data key: Alpha Vantage, then Finnhub
    pub fn stock_api_key(&self) -> Option<&str> {
        self.alpha_vantage_api_key
            .as_deref()
            .or(self.finnhub_api_key.as_deref())
    }

    /// Provider the preferred key belongs to
    pub fn market_data_provider(&self) -> MarketDataProvider {
        if self.alpha_vantage_api_key.is_some() {
            MarketDataProvider::AlphaVantage
        } else if self.finnhub_api_key.is_some() {
            MarketDataProvider::Finnhub
        } else {
            MarketDataProvider::Yahoo
        }
    }

    /// `(key, value)` pairs in contract order with secrets masked
    pub fn redacted_summary(&self) -> Vec<(&'static str, String)> {
        let secret = |v: &Option<String>| match v {
            Some(_) => "***".to_string(),
            None => "<unset>".to_string(),
        };

        vec![
            (keys::OPENAI_API_KEY, secret(&self.openai_api_key)),
            (keys::OPENAI_MODEL, self.openai_model.clone()),
            (keys::OPENAI_API_BASE, self.openai_api_base.clone()),
            (keys::ALPHA_VANTAGE_API_KEY, secret(&self.alpha_vantage_api_key)),
            (keys::FINNHUB_API_KEY, secret(&self.finnhub_api_key)),
            (keys::MASTER_AGENT_TEMPERATURE, self.master_temperature.to_string()),
            (keys::JUNIOR_AGENT_TEMPERATURE, self.junior_temperature.to_string()),
            (
                keys::ORCHESTRATOR_AGENT_TEMPERATURE,
                self.orchestrator_temperature.to_string(),
            ),
            (keys::MAX_ITERATIONS, self.max_iterations.to_string()),
            (keys::VERBOSE, self.verbose.to_string()),
        ]
    }
}

fn collect_env_file<I>(iter: I) -> Result<HashMap<String, String>, ConfigError>
where
    I: Iterator<Item = dotenvy::Result<(String, String)>>,
{
    iter.map(|item| item.map_err(ConfigError::from)).collect()
}

fn parse_temperature(key: &'static str, raw: &str) -> Result<f32, ConfigError> {
    let value = parse_value::<f32>(key, raw, "expected a number")?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        })
    }
}

fn parse_max_iterations(raw: &str) -> Result<usize, ConfigError> {
    let value = parse_value::<usize>(keys::MAX_ITERATIONS, raw, "expected a positive integer")?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: keys::MAX_ITERATIONS,
            value: raw.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str, reason: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.openai_api_key, None);
        assert_eq!(settings.openai_model, "gpt-4");
        assert_eq!(settings.openai_api_base, "https://api.openai.com/v1");
        assert!((settings.master_temperature - 0.7).abs() < f32::EPSILON);
        assert!((settings.junior_temperature - 0.5).abs() < f32::EPSILON);
        assert!((settings.orchestrator_temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(settings.max_iterations, 10);
        assert!(settings.verbose);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", ""),
            ("OPENAI_MODEL", "  "),
            ("MAX_ITERATIONS", ""),
        ]))
        .unwrap();
        assert!(settings.openai_api_key.is_none());
        assert_eq!(settings.openai_model, "gpt-4");
        assert_eq!(settings.max_iterations, 10);
    }

    #[test]
    fn test_verbose_semantics() {
        for (raw, expected) in [
            ("True", true),
            ("true", true),
            ("TRUE", true),
            ("False", false),
            ("1", false),
            ("yes", false),
        ] {
            let settings = Settings::from_lookup(lookup(&[("VERBOSE", raw)])).unwrap();
            assert_eq!(settings.verbose, expected, "VERBOSE={raw}");
        }
    }

    #[test]
    fn test_invalid_temperature_names_key() {
        let err = Settings::from_lookup(lookup(&[("JUNIOR_AGENT_TEMPERATURE", "1.5")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "JUNIOR_AGENT_TEMPERATURE");
                assert_eq!(value, "1.5");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err =
            Settings::from_lookup(lookup(&[("MASTER_AGENT_TEMPERATURE", "hot")])).unwrap_err();
        assert!(err.to_string().contains("MASTER_AGENT_TEMPERATURE"));
    }

    #[test]
    fn test_invalid_max_iterations() {
        assert!(Settings::from_lookup(lookup(&[("MAX_ITERATIONS", "0")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("MAX_ITERATIONS", "-3")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("MAX_ITERATIONS", "ten")])).is_err());
        let settings = Settings::from_lookup(lookup(&[("MAX_ITERATIONS", "3")])).unwrap();
        assert_eq!(settings.max_iterations, 3);
    }

    #[test]
    fn test_validate_requires_openai_key() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "OPENAI_API_KEY is required. Please set it in your .env file"
        );

        let settings = Settings::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_stock_key_preference() {
        let both = Settings::from_lookup(lookup(&[
            ("ALPHA_VANTAGE_API_KEY", "av"),
            ("FINNHUB_API_KEY", "fh"),
        ]))
        .unwrap();
        assert_eq!(both.stock_api_key(), Some("av"));
        assert_eq!(both.market_data_provider(), MarketDataProvider::AlphaVantage);

        let finnhub = Settings::from_lookup(lookup(&[("FINNHUB_API_KEY", "fh")])).unwrap();
        assert_eq!(finnhub.stock_api_key(), Some("fh"));
        assert_eq!(finnhub.market_data_provider(), MarketDataProvider::Finnhub);

        let none = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(none.stock_api_key(), None);
        assert_eq!(none.market_data_provider(), MarketDataProvider::Yahoo);
    }

    #[test]
    fn test_secrets_redacted() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-very-secret"),
            ("FINNHUB_API_KEY", "fh-secret"),
        ]))
        .unwrap();

        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(!debug.contains("fh-secret"));

        let summary = settings.redacted_summary();
        assert_eq!(summary.len(), ENV_KEYS.len());
        assert!(summary.iter().any(|(k, v)| *k == "OPENAI_API_KEY" && v == "***"));
        assert!(
            summary
                .iter()
                .any(|(k, v)| *k == "ALPHA_VANTAGE_API_KEY" && v == "<unset>")
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OPENAI_API_KEY=from-file").unwrap();
        writeln!(file, "OPENAI_MODEL=gpt-4o").unwrap();
        writeln!(file, "MAX_ITERATIONS=4").unwrap();

        let from_file =
            collect_env_file(dotenvy::from_path_iter(file.path()).unwrap()).unwrap();
        let settings = Settings::layered(
            lookup(&[
                ("OPENAI_API_KEY", "   "),
                ("OPENAI_MODEL", "gpt-4-turbo"),
                ("MAX_ITERATIONS", ""),
            ]),
            &from_file,
        )
        .unwrap();

        assert_eq!(settings.openai_api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.openai_model, "gpt-4-turbo");
        assert_eq!(settings.max_iterations, 4);
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load_from(dir.path().join("missing.env"));
        assert!(matches!(result, Err(ConfigError::EnvFile(_))));
    }

    #[test]
    fn test_contract_table() {
        assert_eq!(ENV_KEYS.len(), 10);
        assert!(env_key("OPENAI_API_KEY").unwrap().required);
        assert!(ENV_KEYS.iter().filter(|k| k.required).count() == 1);
        for key in ENV_KEYS.iter().filter(|k| k.default.is_some()) {
            assert!(Settings::from_lookup(lookup(&[(key.name, key.default.unwrap())])).is_ok());
        }
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(MarketDataProvider::Yahoo.to_string(), "Yahoo Finance");
        assert_eq!(
            serde_json::to_value(MarketDataProvider::AlphaVantage).unwrap(),
            "alpha_vantage"
        );
    }
}
