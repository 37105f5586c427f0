//! Static metadata of the rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How loudly a diagnostic is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hidden,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hidden => "hidden",
        };
        f.write_str(label)
    }
}

/// Descriptor shared by every diagnostic the rule reports.
#[derive(Debug)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
}

pub static USE_THROW_IF_CANCELLATION_REQUESTED: RuleDescriptor = RuleDescriptor {
    id: "UseThrowIfCancellationRequested",
    title: "Use ThrowIfCancellationRequested",
    message: "Replace if statement with ThrowIfCancellationRequested()",
    description: "An if statement that only throws when a CancellationToken reports \
                  cancellation can be replaced by a call to \
                  CancellationToken.ThrowIfCancellationRequested().",
    category: "Naming",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// Member whose check triggers the rule.
pub const CANCELLATION_FLAG: &str = "IsCancellationRequested";

/// Simple name the receiver's type must have.
pub const CANCELLATION_TOKEN_TYPE: &str = "CancellationToken";

/// Method the rewrite calls instead.
pub const THROW_IF_CANCELLATION_REQUESTED: &str = "ThrowIfCancellationRequested";

/// Title of the code action offered for the rule.
pub const FIX_TITLE: &str = "Use ThrowIfCancellationRequested()";
