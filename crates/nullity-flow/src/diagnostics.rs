use nullity_types::{Diagnostic, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDiagnosticKind {
    /// Dereference of a value known to be null on every path.
    NullDereference,
    /// Dereference of a declared-nullable value not yet proven non-null.
    PossibleNullDereference,
    /// Null test on a value already known to be non-null.
    RedundantNullCheck,
}

#[derive(Debug, Clone, Copy)]
pub struct FlowConfig {
    /// Emit warnings on dereference of values that may be null.
    pub report_possible_null_deref: bool,
    /// Emit info diagnostics for null checks that can never fire.
    pub report_redundant_null_check: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            report_possible_null_deref: true,
            report_redundant_null_check: true,
        }
    }
}

pub(crate) fn diagnostic(kind: FlowDiagnosticKind, span: Option<Span>, message: String) -> Diagnostic {
    match kind {
        FlowDiagnosticKind::NullDereference => {
            Diagnostic::error("FLOW_NULL_DEREF", message, span)
        }
        FlowDiagnosticKind::PossibleNullDereference => {
            Diagnostic::warning("FLOW_MAYBE_NULL_DEREF", message, span)
        }
        FlowDiagnosticKind::RedundantNullCheck => {
            Diagnostic::info("FLOW_REDUNDANT_NULL_CHECK", message, span)
        }
    }
}
