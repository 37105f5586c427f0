use crate::rule::{RuleDescriptor, Severity};
use crate::syntax::LineColumn;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// Where a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: PathBuf,
    pub byte_start: usize,
    pub byte_end: usize,
    pub start: LineColumn,
    pub end: LineColumn,
}

impl Location {
    pub fn span(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }
}

/// One reported occurrence of the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: &'static str,
    pub message: &'static str,
    pub severity: Severity,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(rule: &RuleDescriptor, severity: Severity, location: Location) -> Self {
        Self {
            id: rule.id,
            message: rule.message,
            severity,
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.location.file.display(),
            self.location.start.line,
            self.location.start.column,
            self.severity,
            self.id,
            self.message
        )
    }
}
