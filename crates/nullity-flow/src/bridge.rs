//! Seeding, refinement, and dereference judgment for null flow states.
//!
//! The declaration side speaks in qualifiers, the flow side in abstract
//! states per program point. This module translates between the two: a
//! declared qualifier seeds the state a variable starts in, flow facts
//! refine it, and the refined state decides what a dereference reports.

use nullity_types::{Diagnostic, Qualifier, Span};

use crate::diagnostics::{diagnostic, FlowConfig, FlowDiagnosticKind};

/// Abstract nullness of a value at one program point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullState {
    Null,
    NonNull,
    Unknown,
}

/// Join at a control-flow merge: agreeing branches keep their state,
/// disagreeing ones lose precision.
#[must_use]
pub fn join(a: NullState, b: NullState) -> NullState {
    if a == b {
        a
    } else {
        NullState::Unknown
    }
}

/// A variable's state on entry, together with whether its declaration admits
/// null at all. A declared-nullable and a legacy-unannotated variable both
/// start `Unknown`, but only the former is *known* to possibly hold null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededState {
    pub state: NullState,
    pub possibly_null: bool,
}

/// The state a freshly-scoped value starts in, before any flow fact.
pub fn seed(declared: Qualifier) -> SeededState {
    match declared {
        Qualifier::NonNull => SeededState {
            state: NullState::NonNull,
            possibly_null: false,
        },
        Qualifier::Nullable => SeededState {
            state: NullState::Unknown,
            possibly_null: true,
        },
        Qualifier::Unspecified => SeededState {
            state: NullState::Unknown,
            possibly_null: false,
        },
    }
}

/// An observation the flow analysis made about a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFact {
    /// Assigned the literal `null`.
    AssignedNull,
    /// Assigned an expression whose static type is the given qualifier.
    Assigned(Qualifier),
    /// Passed a `x != null` style test on the true edge.
    TestedNonNull,
    /// Passed a `x == null` style test on the true edge.
    TestedNull,
}

/// Apply a flow fact to the current state. Facts are strictly more precise
/// than declarations: a successful null test overrides even a `NonNull`
/// declaration (the declaration was wrong, but the flow side is not the
/// place to say so).
#[must_use]
pub fn refine(current: NullState, fact: FlowFact) -> NullState {
    match fact {
        FlowFact::AssignedNull => NullState::Null,
        FlowFact::Assigned(Qualifier::NonNull) => NullState::NonNull,
        FlowFact::Assigned(Qualifier::Nullable | Qualifier::Unspecified) => NullState::Unknown,
        FlowFact::TestedNonNull => NullState::NonNull,
        FlowFact::TestedNull => match current {
            // The test cannot succeed; keep the contradiction visible.
            NullState::NonNull => NullState::NonNull,
            NullState::Null | NullState::Unknown => NullState::Null,
        },
    }
}

/// Judge a dereference of a value with the given declaration and state.
///
/// A definitely-null dereference is always an error. An `Unknown` state is
/// reported only when the declaration admits null: legacy unannotated values
/// stay silent, matching the unchecked philosophy of the declaration side.
pub fn check_dereference(
    config: FlowConfig,
    declared: Qualifier,
    state: NullState,
    name: &str,
    span: Option<Span>,
) -> Option<Diagnostic> {
    match state {
        NullState::Null => Some(diagnostic(
            FlowDiagnosticKind::NullDereference,
            span,
            format!("Null pointer access: '{name}' can only be null at this location"),
        )),
        NullState::Unknown => {
            let possibly_null = seed(declared).possibly_null;
            if possibly_null && config.report_possible_null_deref {
                Some(diagnostic(
                    FlowDiagnosticKind::PossibleNullDereference,
                    span,
                    format!("Potential null pointer access: '{name}' may be null at this location"),
                ))
            } else {
                None
            }
        }
        NullState::NonNull => None,
    }
}

/// Judge a null test against the state flowing into it.
pub fn check_null_test(
    config: FlowConfig,
    state: NullState,
    name: &str,
    span: Option<Span>,
) -> Option<Diagnostic> {
    if state == NullState::NonNull && config.report_redundant_null_check {
        Some(diagnostic(
            FlowDiagnosticKind::RedundantNullCheck,
            span,
            format!("Redundant null check: '{name}' cannot be null at this location"),
        ))
    } else {
        None
    }
}
