//! The nullness checking engine: scoped defaults, the compatibility
//! relation, type-argument binding checks, and override contracts.
//!
//! All entry points are pure: they read immutable annotated type trees and
//! produce verdicts or diagnostics, never mutating shared state. A single
//! comparison site may yield several findings; nothing in this crate stops
//! at the first violation.

mod compat;
mod overrides;
mod scopes;
mod subst;

pub use crate::compat::{
    as_supertype, check, check_null_literal, outcome_to_diagnostics, CheckOutcome, Finding,
    Verdict,
};
pub use crate::overrides::{check_override, InheritedSig, MethodSig};
pub use crate::scopes::{
    apply_bound_default, apply_default, check_annotation_location, DefaultLocation, DefaultScope,
    LocationSet,
};
pub use crate::subst::{check_binding, check_instantiation, BindingError, Substitution};
