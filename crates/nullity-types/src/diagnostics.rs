use std::fmt;

use serde::{Deserialize, Serialize};

/// A byte-span into a source string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            span,
        }
    }
}

/// Every kind of finding this subsystem can report.
///
/// All categories are purely diagnostic: they never abort analysis of
/// unrelated declarations, and a single expression may report several of
/// them at once.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[derive(schemars::JsonSchema)]
pub enum DiagnosticCategory {
    /// Qualifier written where the grammar admits no type-use annotation.
    IllegalLocation,
    /// NonNull and Nullable both reachable for one position.
    Contradiction,
    /// Incompatible qualifiers between required and provided.
    Mismatch,
    /// Unspecified source used where an annotated target is required.
    Unchecked,
    /// Actual type argument violates a type parameter's own constraint.
    Binding,
    /// Inherited override contract not honored.
    OverrideViolation,
    /// Explicit qualifier equal to the applicable default, or a default
    /// scope already implied by its enclosing scope.
    Redundant,
}

impl DiagnosticCategory {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticCategory::IllegalLocation => "NULL_ILLEGAL_LOCATION",
            DiagnosticCategory::Contradiction => "NULL_CONTRADICTION",
            DiagnosticCategory::Mismatch => "NULL_MISMATCH",
            DiagnosticCategory::Unchecked => "NULL_UNCHECKED",
            DiagnosticCategory::Binding => "NULL_BINDING",
            DiagnosticCategory::OverrideViolation => "NULL_OVERRIDE",
            DiagnosticCategory::Redundant => "NULL_REDUNDANT",
        }
    }
}
