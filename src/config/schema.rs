use crate::rule::{Severity, USE_THROW_IF_CANCELLATION_REQUESTED};
use serde::Deserialize;
use std::fmt;

/// Contents of `cancelcheck.toml`. Every table and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub rule: RuleConfig,
    #[serde(default)]
    pub fix: FixConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixConfig {
    /// Re-indent rewritten statements to the line they replace.
    ///
    /// When off, a statement takes the whitespace that preceded the throw,
    /// so `if (...) throw ...;` on one line becomes a call at column 0.
    #[serde(default = "default_true")]
    pub format: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// File extensions analyzed, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory names skipped while walking and never written to.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_enabled() -> bool {
    USE_THROW_IF_CANCELLATION_REQUESTED.enabled_by_default
}

fn default_severity() -> Severity {
    USE_THROW_IF_CANCELLATION_REQUESTED.default_severity
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["cs".to_string()]
}

fn default_exclude() -> Vec<String> {
    crate::safety::DEFAULT_FORBIDDEN_DIRS
        .iter()
        .map(|dir| dir.to_string())
        .collect()
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            severity: default_severity(),
        }
    }
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            format: default_true(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: default_exclude(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.files.extensions.is_empty() {
            issues.push(ValidationIssue::Empty {
                field: "files.extensions",
            });
        }
        for extension in &self.files.extensions {
            if extension.is_empty() || extension.starts_with('.') || extension.contains('/') {
                issues.push(ValidationIssue::InvalidValue {
                    field: "files.extensions",
                    value: extension.clone(),
                    message: "expected a bare extension such as \"cs\"",
                });
            }
        }
        for dir in &self.files.exclude {
            if dir.is_empty() || dir.contains(['/', '\\']) {
                issues.push(ValidationIssue::InvalidValue {
                    field: "files.exclude",
                    value: dir.clone(),
                    message: "expected a single directory name",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Whether `extension` names a file this configuration analyzes.
    pub fn is_source_extension(&self, extension: &str) -> bool {
        self.files
            .extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    Empty {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        value: String,
        message: &'static str,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::InvalidValue {
                field,
                value,
                message,
            } => write!(f, "'{field}' has invalid entry '{value}': {message}"),
        }
    }
}
