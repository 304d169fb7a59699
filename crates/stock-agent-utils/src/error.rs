//! Error types for configuration loading and template parsing

use thiserror::Error;

/// Errors raised while building `Settings`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required key is missing or empty
    #[error("{key} is required. Please set it in your .env file")]
    MissingRequired {
        /// Environment variable name
        key: &'static str,
    },

    /// A value failed to parse or is out of range
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// Environment variable name
        key: &'static str,
        /// Raw value as found
        value: String,
        /// What was expected
        reason: String,
    },

    /// The .env file exists but could not be read or parsed
    #[error("Failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Errors raised while parsing an env template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Line is neither a comment, blank, nor `KEY=value`
    #[error("line {line}: expected KEY=value")]
    MissingEquals {
        /// 1-based line number
        line: usize,
    },

    /// Nothing before the `=`
    #[error("line {line}: empty key")]
    EmptyKey {
        /// 1-based line number
        line: usize,
    },

    /// Key contains characters outside `[A-Z0-9_]`
    #[error("line {line}: invalid key '{key}'")]
    InvalidKey {
        /// 1-based line number
        line: usize,
        /// Offending key
        key: String,
    },

    /// Key declared twice
    #[error("line {line}: duplicate key '{key}'")]
    DuplicateKey {
        /// 1-based line number
        line: usize,
        /// Offending key
        key: String,
    },
}
