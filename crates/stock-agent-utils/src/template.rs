//! The `env_example.txt` template
//!
//! Parsing rules: `#` lines are comments, consecutive comment lines directly
//! above a key document that key, and a blank line drops pending comments.

use crate::TemplateError;
use crate::config::{ENV_KEYS, env_key};
use std::collections::HashSet;
use std::fmt;

/// The template shipped at the workspace root
pub const ENV_EXAMPLE: &str = include_str!("../../../env_example.txt");

/// One `KEY=value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    pub key: String,
    pub value: String,
    /// Comment lines above the key, without the leading `#`
    pub docs: Vec<String>,
    /// 1-based line number
    pub line: usize,
}

/// Parsed env template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvTemplate {
    entries: Vec<TemplateEntry>,
}

/// A documentation-completeness problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocIssue {
    /// Declared key has no comment above it
    Undocumented { key: String, line: usize },
    /// Declared key is not part of the contract
    UnknownKey { key: String, line: usize },
    /// Contract key is not declared
    MissingKey { key: &'static str },
    /// Declared value differs from the contract default
    DefaultMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },
}

impl fmt::Display for DocIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undocumented { key, line } => write!(f, "line {line}: {key} has no documentation"),
            Self::UnknownKey { key, line } => write!(f, "line {line}: {key} is not a known setting"),
            Self::MissingKey { key } => write!(f, "{key} is not declared"),
            Self::DefaultMismatch {
                key,
                expected,
                found,
            } => write!(f, "{key} declares '{found}' but the default is '{expected}'"),
        }
    }
}

impl EnvTemplate {
    /// Parse template text
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut pending_docs = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                pending_docs.clear();
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                pending_docs.push(comment.trim().to_string());
                continue;
            }

            let (key, value) = trimmed
                .split_once('=')
                .ok_or(TemplateError::MissingEquals { line })?;
            let key = key.trim();

            if key.is_empty() {
                return Err(TemplateError::EmptyKey { line });
            }
            if !key
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(TemplateError::InvalidKey {
                    line,
                    key: key.to_string(),
                });
            }
            if !seen.insert(key.to_string()) {
                return Err(TemplateError::DuplicateKey {
                    line,
                    key: key.to_string(),
                });
            }

            entries.push(TemplateEntry {
                key: key.to_string(),
                value: value.trim().to_string(),
                docs: std::mem::take(&mut pending_docs),
                line,
            });
        }

        Ok(Self { entries })
    }

    /// Parse the embedded `env_example.txt`
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::parse(ENV_EXAMPLE)
    }

    /// Declared entries in file order
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    /// Look up a declared entry
    pub fn get(&self, key: &str) -> Option<&TemplateEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Compare the template against the contract; empty means complete
    pub fn check_documentation(&self) -> Vec<DocIssue> {
        let mut issues = Vec::new();

        for entry in &self.entries {
            if entry.docs.iter().all(String::is_empty) {
                issues.push(DocIssue::Undocumented {
                    key: entry.key.clone(),
                    line: entry.line,
                });
            }

            match env_key(&entry.key) {
                None => issues.push(DocIssue::UnknownKey {
                    key: entry.key.clone(),
                    line: entry.line,
                }),
                Some(contract) => {
                    if let Some(expected) = contract.default {
                        if entry.value != expected {
                            issues.push(DocIssue::DefaultMismatch {
                                key: entry.key.clone(),
                                expected,
                                found: entry.value.clone(),
                            });
                        }
                    }
                }
            }
        }

        for key in ENV_KEYS {
            if self.get(key.name).is_none() {
                issues.push(DocIssue::MissingKey { key: key.name });
            }
        }

        issues
    }
}

/// Render a fresh template from the contract
pub fn render_template() -> String {
    let mut out = String::from(
        "# AI Stock Analysis Agent System - environment template\n\
         # Copy this file to .env and fill in your keys.\n",
    );

    for key in ENV_KEYS {
        let value = match key.default {
            Some(default) => default.to_string(),
            None => format!("your_{}_here", key.name.to_ascii_lowercase()),
        };
        out.push('\n');
        out.push_str(&format!("# {}\n{}={}\n", key.description, key.name, value));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_template_is_complete() {
        let template = EnvTemplate::embedded().unwrap();
        assert_eq!(template.entries().len(), ENV_KEYS.len());
        assert_eq!(template.check_documentation(), Vec::new());
    }

    #[test]
    fn test_rendered_template_is_complete() {
        let rendered = render_template();
        let template = EnvTemplate::parse(&rendered).unwrap();
        assert!(template.check_documentation().is_empty());
        assert_eq!(template.get("VERBOSE").unwrap().value, "True");
    }

    #[test]
    fn test_docs_attach_to_next_key() {
        let template = EnvTemplate::parse(
            "# header\n\n# model to use\n# second line\nOPENAI_MODEL=gpt-4\nVERBOSE=True\n",
        )
        .unwrap();

        let model = template.get("OPENAI_MODEL").unwrap();
        assert_eq!(model.docs, vec!["model to use", "second line"]);
        assert_eq!(model.line, 5);
        assert!(template.get("VERBOSE").unwrap().docs.is_empty());
    }

    #[test]
    fn test_blank_line_resets_docs() {
        let template = EnvTemplate::parse("# orphan\n\nOPENAI_MODEL=gpt-4\n").unwrap();
        let issues = template.check_documentation();
        assert!(issues.contains(&DocIssue::Undocumented {
            key: "OPENAI_MODEL".to_string(),
            line: 3,
        }));
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert_eq!(
            EnvTemplate::parse("# c\nOPENAI_MODEL\n").unwrap_err(),
            TemplateError::MissingEquals { line: 2 }
        );
        assert_eq!(
            EnvTemplate::parse("=value\n").unwrap_err(),
            TemplateError::EmptyKey { line: 1 }
        );
        assert!(matches!(
            EnvTemplate::parse("openai_model=gpt-4\n").unwrap_err(),
            TemplateError::InvalidKey { line: 1, .. }
        ));
        assert!(matches!(
            EnvTemplate::parse("VERBOSE=True\nVERBOSE=False\n").unwrap_err(),
            TemplateError::DuplicateKey { line: 2, .. }
        ));
    }

    #[test]
    fn test_unknown_and_missing_keys() {
        let template = EnvTemplate::parse("# docs\nEXTRA_KEY=1\n").unwrap();
        let issues = template.check_documentation();
        assert!(issues.contains(&DocIssue::UnknownKey {
            key: "EXTRA_KEY".to_string(),
            line: 2,
        }));
        assert!(issues.contains(&DocIssue::MissingKey {
            key: "OPENAI_API_KEY"
        }));
    }

    #[test]
    fn test_default_mismatch() {
        let template = EnvTemplate::parse("# iterations\nMAX_ITERATIONS=20\n").unwrap();
        let issue = template
            .check_documentation()
            .into_iter()
            .find(|i| matches!(i, DocIssue::DefaultMismatch { .. }))
            .unwrap();
        assert_eq!(
            issue.to_string(),
            "MAX_ITERATIONS declares '20' but the default is '10'"
        );
    }
}
