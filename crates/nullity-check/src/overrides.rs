//! Override contract checking.
//!
//! An overriding method may widen what its parameters accept and narrow what
//! it returns, never the reverse. With diamond inheritance every inherited
//! declaration is checked on its own, so one override can violate two
//! ancestors at once and gets a diagnostic per ancestor.

use std::collections::HashMap;

use nullity_types::{
    AnnotatedType, Diagnostic, DiagnosticCategory, NullConfig, Qualifier, Span, TypeEnv,
};
use tracing::debug;

use crate::compat::{check, Finding, Verdict};
use crate::subst::Substitution;

/// A method's nullness-relevant signature.
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<AnnotatedType>,
    pub return_type: AnnotatedType,
}

/// A signature inherited from an ancestor, together with the type arguments
/// the ancestor is instantiated with along the inheritance path.
#[derive(Debug, Clone)]
pub struct InheritedSig {
    pub owner: nullity_types::ClassId,
    pub sig: MethodSig,
    /// Actuals for the owner's type parameters, in declaration order. Empty
    /// for non-generic ancestors or raw inheritance.
    pub type_args: Vec<AnnotatedType>,
}

/// Check `overriding` against every inherited declaration.
pub fn check_override(
    env: &dyn TypeEnv,
    config: &NullConfig,
    overriding: &MethodSig,
    inherited: &[InheritedSig],
    span: Option<Span>,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for ancestor in inherited {
        check_one_ancestor(env, config, overriding, ancestor, span, &mut diags);
    }
    diags
}

fn check_one_ancestor(
    env: &dyn TypeEnv,
    config: &NullConfig,
    overriding: &MethodSig,
    ancestor: &InheritedSig,
    span: Option<Span>,
    diags: &mut Vec<Diagnostic>,
) {
    let owner_name = simple_name(env.class_name(ancestor.owner)).to_string();
    debug!(
        method = %overriding.name,
        ancestor = %owner_name,
        "checking override contract"
    );

    let inherited_sig = instantiate(env, config, ancestor, span, diags);

    for (index, (inh_param, ovr_param)) in inherited_sig
        .params
        .iter()
        .zip(&overriding.params)
        .enumerate()
    {
        check_parameter(
            env,
            config,
            overriding,
            &owner_name,
            index,
            inh_param,
            ovr_param,
            span,
            diags,
        );
    }

    check_return(
        env,
        config,
        overriding,
        &owner_name,
        &inherited_sig.return_type,
        &overriding.return_type,
        span,
        diags,
    );
}

/// Substitute the ancestor's type arguments into its declared signature.
/// `Cell<@Nullable V>` overridden through `extends Cell<String>` compares
/// against `@Nullable String` parameters, not against `V`.
fn instantiate(
    env: &dyn TypeEnv,
    config: &NullConfig,
    ancestor: &InheritedSig,
    span: Option<Span>,
    diags: &mut Vec<Diagnostic>,
) -> MethodSig {
    if ancestor.type_args.is_empty() {
        return ancestor.sig.clone();
    }
    let Some(def) = env.class(ancestor.owner) else {
        return ancestor.sig.clone();
    };

    let mut map = HashMap::with_capacity(def.type_params.len());
    for (idx, formal) in def.type_params.iter().copied().enumerate() {
        if let Some(actual) = ancestor.type_args.get(idx) {
            map.insert(formal, actual.clone());
        }
    }

    let mut subst = Substitution::new(env, map);
    let sig = MethodSig {
        name: ancestor.sig.name.clone(),
        params: ancestor.sig.params.iter().map(|p| subst.apply(p)).collect(),
        return_type: subst.apply(&ancestor.sig.return_type),
    };

    for var in subst.take_contradictions() {
        let var_name = env
            .type_param(var)
            .map(|tp| tp.name.clone())
            .unwrap_or_else(|| "?".to_string());
        diags.extend(config.diagnostic(
            DiagnosticCategory::Contradiction,
            format!(
                "Contradictory null annotations: the use of type variable \
                 '{var_name}' in '{}' conflicts with the variable's own null \
                 constraint",
                ancestor.sig.name
            ),
            span,
        ));
    }
    sig
}

#[allow(clippy::too_many_arguments)]
fn check_parameter(
    env: &dyn TypeEnv,
    config: &NullConfig,
    overriding: &MethodSig,
    owner_name: &str,
    index: usize,
    inherited: &AnnotatedType,
    param: &AnnotatedType,
    span: Option<Span>,
    diags: &mut Vec<Diagnostic>,
) {
    let inh_q = inherited.effective_qualifier(env);
    let ovr_q = param.effective_qualifier(env);
    let ordinal = index + 1;
    let name = &overriding.name;

    match (inh_q, ovr_q) {
        (Qualifier::Unspecified, Qualifier::NonNull) => {
            diags.extend(config.diagnostic(
                DiagnosticCategory::OverrideViolation,
                format!(
                    "Illegal redefinition of parameter {ordinal} of '{name}': the \
                     method inherited from '{owner_name}' does not constrain this \
                     parameter"
                ),
                span,
            ));
        }
        (Qualifier::Nullable, Qualifier::NonNull) => {
            diags.extend(config.diagnostic(
                DiagnosticCategory::OverrideViolation,
                format!(
                    "Illegal redefinition of parameter {ordinal} of '{name}': \
                     mismatching null constraints with the method inherited from \
                     '{owner_name}'"
                ),
                span,
            ));
        }
        (Qualifier::NonNull, Qualifier::Unspecified) => {
            diags.extend(config.diagnostic(
                DiagnosticCategory::Unchecked,
                format!(
                    "Missing non-null annotation: parameter {ordinal} of '{name}' \
                     is '@NonNull' in the method inherited from '{owner_name}'"
                ),
                span,
            ));
        }
        // Same qualifier, or the override widens what it accepts.
        (Qualifier::NonNull, Qualifier::NonNull | Qualifier::Nullable)
        | (Qualifier::Nullable, Qualifier::Nullable | Qualifier::Unspecified)
        | (Qualifier::Unspecified, Qualifier::Nullable | Qualifier::Unspecified) => {}
    }

    // Inherited argument values flow into the overriding parameter; nested
    // positions (type arguments, array dimensions) are judged structurally.
    let outcome = check(env, param, inherited);
    extend_with_nested(config, owner_name, name, &outcome.findings, span, diags);
}

#[allow(clippy::too_many_arguments)]
fn check_return(
    env: &dyn TypeEnv,
    config: &NullConfig,
    overriding: &MethodSig,
    owner_name: &str,
    inherited: &AnnotatedType,
    ret: &AnnotatedType,
    span: Option<Span>,
    diags: &mut Vec<Diagnostic>,
) {
    let inh_q = inherited.effective_qualifier(env);
    let ovr_q = ret.effective_qualifier(env);
    let name = &overriding.name;

    match (inh_q, ovr_q) {
        (Qualifier::NonNull, Qualifier::Nullable) => {
            diags.extend(config.diagnostic(
                DiagnosticCategory::OverrideViolation,
                format!(
                    "The return type of '{name}' is incompatible with the \
                     '@NonNull' return of the method inherited from '{owner_name}'"
                ),
                span,
            ));
        }
        (Qualifier::NonNull, Qualifier::Unspecified) => {
            diags.extend(config.diagnostic(
                DiagnosticCategory::Unchecked,
                format!(
                    "Missing non-null annotation: the return type of '{name}' is \
                     '@NonNull' in the method inherited from '{owner_name}'"
                ),
                span,
            ));
        }
        // Same qualifier, or the override narrows what it may return.
        (Qualifier::NonNull, Qualifier::NonNull)
        | (Qualifier::Nullable | Qualifier::Unspecified, _) => {}
    }

    // Overriding return values flow out through the inherited declaration.
    let outcome = check(env, inherited, ret);
    extend_with_nested(config, owner_name, name, &outcome.findings, span, diags);
}

/// Map nested structural findings to override diagnostics. Root findings are
/// skipped: the top-level qualifier was judged with override-specific rules
/// above.
fn extend_with_nested(
    config: &NullConfig,
    owner_name: &str,
    method: &str,
    findings: &[Finding],
    span: Option<Span>,
    diags: &mut Vec<Diagnostic>,
) {
    for finding in findings {
        if finding.path.is_root() {
            continue;
        }
        let category = match finding.verdict {
            Verdict::Exact => continue,
            Verdict::UncheckedWarning => DiagnosticCategory::Unchecked,
            Verdict::Mismatch => DiagnosticCategory::OverrideViolation,
        };
        diags.extend(config.diagnostic(
            category,
            format!(
                "Illegal redefinition in '{method}' ({}): incompatible with the \
                 method inherited from '{owner_name}'",
                finding.path.describe()
            ),
            span,
        ));
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
