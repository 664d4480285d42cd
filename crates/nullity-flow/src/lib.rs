//! The bridge between declared nullness qualifiers and intraprocedural flow
//! facts: seeding abstract states from declarations, refining them with
//! tests and assignments, and judging dereferences.

mod bridge;
mod diagnostics;

pub use crate::bridge::{
    check_dereference, check_null_test, join, refine, seed, FlowFact, NullState, SeededState,
};
pub use crate::diagnostics::{FlowConfig, FlowDiagnosticKind};
