//! Session configuration: which annotation names carry nullness semantics,
//! and how severe each diagnostic category is.
//!
//! The configuration is installed once per process, before any compilation
//! unit is analyzed, and is read-only afterwards. Changing it requires a
//! fresh session.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticCategory, Severity, Span};

/// Semantic role of a recognized qualifier annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationRole {
    NonNull,
    Nullable,
    /// Scope-level default marker (`@NullMarked`, `@NonNullByDefault`, ...).
    NonNullByDefault,
}

/// Configured severity of a diagnostic category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Ignore,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NullConfig {
    /// Fully qualified annotation names meaning "definitely non-null".
    pub nonnull_annotations: Vec<String>,
    /// Fully qualified annotation names meaning "possibly null".
    pub nullable_annotations: Vec<String>,
    /// Fully qualified names of scope-default markers.
    pub default_annotations: Vec<String>,
    /// Per-category severity overrides. Categories not listed keep their
    /// built-in severity.
    pub severities: BTreeMap<DiagnosticCategory, SeverityLevel>,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            nonnull_annotations: vec![
                "org.jspecify.annotations.NonNull".to_string(),
                "org.eclipse.jdt.annotation.NonNull".to_string(),
                "javax.annotation.Nonnull".to_string(),
            ],
            nullable_annotations: vec![
                "org.jspecify.annotations.Nullable".to_string(),
                "org.eclipse.jdt.annotation.Nullable".to_string(),
                "javax.annotation.Nullable".to_string(),
            ],
            default_annotations: vec![
                "org.jspecify.annotations.NullMarked".to_string(),
                "org.eclipse.jdt.annotation.NonNullByDefault".to_string(),
            ],
            severities: BTreeMap::new(),
        }
    }
}

impl NullConfig {
    /// Map an annotation's qualified name to its nullness role, if any.
    pub fn classify(&self, name: &str) -> Option<AnnotationRole> {
        if self.nonnull_annotations.iter().any(|n| n == name) {
            return Some(AnnotationRole::NonNull);
        }
        if self.nullable_annotations.iter().any(|n| n == name) {
            return Some(AnnotationRole::Nullable);
        }
        if self.default_annotations.iter().any(|n| n == name) {
            return Some(AnnotationRole::NonNullByDefault);
        }
        None
    }

    pub fn severity(&self, category: DiagnosticCategory) -> SeverityLevel {
        if let Some(level) = self.severities.get(&category) {
            return *level;
        }
        match category {
            DiagnosticCategory::IllegalLocation
            | DiagnosticCategory::Contradiction
            | DiagnosticCategory::Mismatch
            | DiagnosticCategory::Binding
            | DiagnosticCategory::OverrideViolation => SeverityLevel::Error,
            DiagnosticCategory::Unchecked => SeverityLevel::Warning,
            DiagnosticCategory::Redundant => SeverityLevel::Ignore,
        }
    }

    /// Build a diagnostic for `category`, honoring the configured severity.
    /// Returns `None` when the category is ignored.
    pub fn diagnostic(
        &self,
        category: DiagnosticCategory,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Option<Diagnostic> {
        let severity = match self.severity(category) {
            SeverityLevel::Ignore => {
                // Redundancy stays visible as info even when "ignored":
                // it is informational to begin with, never blocking.
                if category == DiagnosticCategory::Redundant {
                    Severity::Info
                } else {
                    return None;
                }
            }
            SeverityLevel::Warning => Severity::Warning,
            SeverityLevel::Error => Severity::Error,
        };
        Some(Diagnostic {
            severity,
            code: category.code(),
            message: message.into(),
            span,
        })
    }
}

static SESSION: OnceLock<NullConfig> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("session null configuration is already installed")]
    AlreadyInstalled,
}

/// Install the process-wide configuration. Must happen before any
/// compilation unit is analyzed; fails if a configuration is already live.
pub fn install_session(config: NullConfig) -> Result<(), ConfigError> {
    SESSION.set(config).map_err(|_| ConfigError::AlreadyInstalled)
}

/// The live session configuration, or the built-in defaults if the driver
/// never installed one.
pub fn session() -> &'static NullConfig {
    SESSION.get_or_init(NullConfig::default)
}
