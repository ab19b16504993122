//! Diagnostics
//!
//! Located validation failures shared by every phase of the linter.

use serde::Serialize;
use std::fmt;

use crate::parser::Position;

/// Which phase produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Tag/attribute syntax, nesting or root cardinality
    MalformedSyntax,
    /// Finding of a registered structural rule
    StructuralViolation,
    /// File could not be read or decoded
    IoFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedSyntax => "malformed-syntax",
            DiagnosticKind::StructuralViolation => "structural-violation",
            DiagnosticKind::IoFailure => "io-failure",
        };
        f.write_str(name)
    }
}

/// Severity of a diagnostic. Every finding fails the file, so there is a
/// single tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A single located, described validation failure
///
/// The file path lives on the owning [`FileVerdict`](crate::validation::FileVerdict);
/// rules stay pure functions of the tree and never see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Absent only for whole-file failures such as unreadable input
    pub position: Option<Position>,
    pub message: String,
    /// Name of the rule that produced a structural violation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Diagnostic {
    pub fn malformed(position: Position, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MalformedSyntax,
            severity: Severity::Error,
            position: Some(position),
            message: message.into(),
            rule: None,
        }
    }

    pub fn structural(position: Position, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::StructuralViolation,
            severity: Severity::Error,
            position: Some(position),
            message: message.into(),
            rule: None,
        }
    }

    pub fn io_failure(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::IoFailure,
            severity: Severity::Error,
            position: None,
            message: message.into(),
            rule: None,
        }
    }

    /// Attribute this diagnostic to a named rule
    pub fn with_rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.position.map(|p| p.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.position.map(|p| p.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.position {
            write!(f, "{}:{}: ", pos.line, pos.column)?;
        }
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(rule) = &self.rule {
            write!(f, " ({rule})")?;
        }
        Ok(())
    }
}
