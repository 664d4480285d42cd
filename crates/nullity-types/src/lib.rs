//! Shared types for the nullity checker: the qualifier lattice, annotated
//! type descriptors, the host type seam, diagnostics, and session
//! configuration.

mod annotated;
mod config;
mod diagnostics;
mod qualifier;
mod types;

pub use crate::annotated::{AnnotatedType, BoundKind, PathStep, PositionKind, Shape, TypePath};
pub use crate::config::{
    install_session, session, AnnotationRole, ConfigError, NullConfig, SeverityLevel,
};
pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, Severity, Span};
pub use crate::qualifier::{Merged, Qualifier};
pub use crate::types::{ClassDef, ClassId, ClassKind, TypeEnv, TypeParamDecl, TypeStore, TypeVarId};
