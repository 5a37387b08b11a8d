// src/diagnostics/mod.rs
// =============================================================================
// Issues reported by the engine.
//
// Submodules:
// - codes:         the stable diagnostic code catalog (E/W/I)
// - anti_patterns: the catalogue of named anti-patterns
//
// This file defines Severity, ValidationLevel and the ValidationIssue record
// that every checking component produces.
// =============================================================================

mod anti_patterns;
mod codes;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use anti_patterns::{AntiPatternCategory, AntiPatternEntry, AntiPatternId, ANTI_PATTERNS};
pub use codes::DiagnosticCode;

/// Ordered by blocking importance: errors sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// Which check produced an issue.
///
/// The first five are the ordered validation levels 0-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Syntax,
    Structure,
    Content,
    AntiPattern,
    Extended,
    Reference,
    LinkHealth,
}

impl ValidationLevel {
    /// Numeric level for the validator levels, `None` for the others.
    pub fn number(self) -> Option<u8> {
        match self {
            ValidationLevel::Syntax => Some(0),
            ValidationLevel::Structure => Some(1),
            ValidationLevel::Content => Some(2),
            ValidationLevel::AntiPattern => Some(3),
            ValidationLevel::Extended => Some(4),
            ValidationLevel::Reference | ValidationLevel::LinkHealth => None,
        }
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub level: ValidationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    /// Entity the issue is about (URL, concept id, section name, `line:N`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Entity the source points at, for cross-reference issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Further identifiers involved, such as the members of a cycle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anti_pattern: Option<AntiPatternId>,
}

impl ValidationIssue {
    pub fn new(code: DiagnosticCode, level: ValidationLevel, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            level,
            line: None,
            message: message.into(),
            source: None,
            target: None,
            related: Vec::new(),
            remediation: code.remediation().to_string(),
            anti_pattern: None,
        }
    }

    /// An issue whose message is the catalog message for its code.
    pub fn from_code(code: DiagnosticCode, level: ValidationLevel) -> Self {
        Self::new(code, level, code.message())
    }

    /// Attach a line number. Zero means "unknown" and is dropped.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = (line > 0).then_some(line);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_related(mut self, related: Vec<String>) -> Self {
        self.related = related;
        self
    }

    pub fn with_anti_pattern(mut self, id: AntiPatternId) -> Self {
        self.anti_pattern = Some(id);
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Two issues with the same key are the same finding.
    pub fn dedup_key(&self) -> (DiagnosticCode, Option<&str>, Option<&str>, &[String]) {
        (
            self.code,
            self.source.as_deref(),
            self.target.as_deref(),
            self.related.as_slice(),
        )
    }
}
