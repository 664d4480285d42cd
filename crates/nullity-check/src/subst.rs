//! Qualifier-aware substitution and type-argument binding checks.
//!
//! Substituting `T := @Nullable String` into a signature must carry the
//! argument's qualifier into every use of `T`, unless the use site pins its
//! own. Binding an actual argument to a declared parameter must honor the
//! parameter's own qualifier and bound.

use std::collections::HashMap;

use nullity_types::{
    AnnotatedType, ClassId, Diagnostic, DiagnosticCategory, NullConfig, Qualifier, Shape, Span,
    TypeEnv, TypeParamDecl, TypeVarId,
};
use thiserror::Error;
use tracing::trace;

use crate::compat::{check, Verdict};

/// A mapping from type variables to actual annotated types, applied
/// recursively. Qualifier collisions between a use site and the incoming
/// actual are recorded rather than silently resolved.
pub struct Substitution<'e> {
    env: &'e dyn TypeEnv,
    map: HashMap<TypeVarId, AnnotatedType>,
    contradictions: Vec<TypeVarId>,
}

impl<'e> Substitution<'e> {
    pub fn new(env: &'e dyn TypeEnv, map: HashMap<TypeVarId, AnnotatedType>) -> Self {
        Self {
            env,
            map,
            contradictions: Vec::new(),
        }
    }

    /// Build a new tree with every mapped variable replaced.
    ///
    /// An explicit use-site qualifier wins over the incoming actual's
    /// qualifier. A use-site qualifier that contradicts the variable's own
    /// declared qualifier records the variable as contradicted; the use
    /// site still wins in the produced tree so checking can continue.
    pub fn apply(&mut self, ty: &AnnotatedType) -> AnnotatedType {
        match &ty.shape {
            Shape::TypeVar(var) => match self.map.get(var) {
                Some(actual) => {
                    let actual = actual.clone();
                    if ty.qualifier.is_specified() {
                        let declared = self
                            .env
                            .type_param(*var)
                            .map(|tp| tp.qualifier)
                            .unwrap_or(Qualifier::Unspecified);
                        if Qualifier::conflict(ty.qualifier, declared) {
                            self.contradictions.push(*var);
                        }
                        actual.with_qualifier(ty.qualifier)
                    } else {
                        actual
                    }
                }
                None => ty.clone(),
            },
            Shape::Leaf(_) => ty.clone(),
            Shape::Parameterized(class, args) => AnnotatedType::parameterized(
                ty.qualifier,
                *class,
                args.iter().map(|a| self.apply(a)).collect(),
            ),
            Shape::Array(element) => AnnotatedType::array(ty.qualifier, self.apply(element)),
            Shape::Wildcard { kind, bound } => AnnotatedType::wildcard(
                ty.qualifier,
                *kind,
                bound.as_deref().map(|b| self.apply(b)),
            ),
        }
    }

    /// Variables whose use-site qualifier contradicted the substituted
    /// actual's, in application order. Draining resets the record.
    pub fn take_contradictions(&mut self) -> Vec<TypeVarId> {
        std::mem::take(&mut self.contradictions)
    }

    pub fn env(&self) -> &'e dyn TypeEnv {
        self.env
    }
}

/// A rejected or suspect type-argument binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error(
        "Null constraint mismatch: the type '{actual}' is not a valid substitute \
         for the type parameter '{param}'"
    )]
    QualifierMismatch { param: String, actual: String },
    #[error(
        "Null type safety: the type '{actual}' needs unchecked conversion to \
         satisfy the constraint on type parameter '{param}'"
    )]
    UncheckedBinding { param: String, actual: String },
    #[error(
        "Null constraint mismatch: the type '{actual}' does not conform to the \
         bound '{bound}' of type parameter '{param}'"
    )]
    BoundMismatch {
        param: String,
        actual: String,
        bound: String,
    },
}

impl BindingError {
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            BindingError::QualifierMismatch { .. } | BindingError::BoundMismatch { .. } => {
                DiagnosticCategory::Binding
            }
            BindingError::UncheckedBinding { .. } => DiagnosticCategory::Unchecked,
        }
    }

    pub fn into_diagnostic(self, config: &NullConfig, span: Option<Span>) -> Option<Diagnostic> {
        let category = self.category();
        config.diagnostic(category, self.to_string(), span)
    }
}

/// Check one actual type argument against one declared type parameter.
///
/// The parameter's own qualifier constrains every instantiation: `<@NonNull
/// T>` rejects `@Nullable` actuals outright and flags unannotated actuals as
/// unchecked. The declared bound is checked with the ordinary compatibility
/// relation.
pub fn check_binding(
    env: &dyn TypeEnv,
    declared: &TypeParamDecl,
    actual: &AnnotatedType,
) -> Vec<BindingError> {
    let mut errors = Vec::new();
    let actual_q = actual.effective_qualifier(env);
    let actual_rendered = actual.render(env);

    if Qualifier::conflict(declared.qualifier, actual_q) {
        errors.push(BindingError::QualifierMismatch {
            param: declared.name.clone(),
            actual: actual_rendered.clone(),
        });
    } else if declared.qualifier == Qualifier::NonNull && !actual_q.is_specified() {
        errors.push(BindingError::UncheckedBinding {
            param: declared.name.clone(),
            actual: actual_rendered.clone(),
        });
    }

    // An unannotated implicit Object bound constrains nothing.
    if !(declared.bound.is_top_object(env) && !declared.bound.qualifier.is_specified()) {
        match check(env, &declared.bound, actual).verdict() {
            Verdict::Exact => {}
            Verdict::UncheckedWarning => errors.push(BindingError::UncheckedBinding {
                param: declared.name.clone(),
                actual: actual_rendered.clone(),
            }),
            Verdict::Mismatch => errors.push(BindingError::BoundMismatch {
                param: declared.name.clone(),
                actual: actual_rendered,
                bound: declared.bound.render(env),
            }),
        }
    }

    errors
}

/// Check every type argument of a parameterization, including arguments
/// nested inside the arguments themselves (`Map<String, List<@Nullable T>>`
/// checks the inner `List` instantiation too).
pub fn check_instantiation(
    env: &dyn TypeEnv,
    class: ClassId,
    args: &[AnnotatedType],
) -> Vec<BindingError> {
    trace!(class = env.class_name(class), "checking instantiation bindings");
    let mut errors = Vec::new();
    check_instantiation_into(env, class, args, &mut errors);
    errors
}

fn check_instantiation_into(
    env: &dyn TypeEnv,
    class: ClassId,
    args: &[AnnotatedType],
    errors: &mut Vec<BindingError>,
) {
    let Some(def) = env.class(class) else { return };

    for (formal, actual) in def.type_params.iter().zip(args) {
        // Wildcards are not substitutes; their bounds are judged where the
        // wildcard type is used, not at the binding.
        if !matches!(actual.shape, Shape::Wildcard { .. }) {
            if let Some(declared) = env.type_param(*formal) {
                errors.extend(check_binding(env, declared, actual));
            }
        }
        visit_nested(env, actual, errors);
    }
}

fn visit_nested(env: &dyn TypeEnv, ty: &AnnotatedType, errors: &mut Vec<BindingError>) {
    match &ty.shape {
        Shape::Leaf(_) | Shape::TypeVar(_) => {}
        Shape::Parameterized(class, args) => {
            check_instantiation_into(env, *class, args, errors);
        }
        Shape::Array(element) => visit_nested(env, element, errors),
        Shape::Wildcard { kind: _, bound } => {
            if let Some(bound) = bound.as_deref() {
                visit_nested(env, bound, errors);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nullity_types::{BoundKind, TypeStore};
    use pretty_assertions::assert_eq;

    fn string_ty(env: &TypeStore, q: Qualifier) -> AnnotatedType {
        AnnotatedType::leaf(q, env.lookup_class("java.lang.String").unwrap())
    }

    #[test]
    fn substitution_carries_argument_qualifier() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );
        let list = env.lookup_class("java.util.List").unwrap();

        let signature_ty = AnnotatedType::parameterized(
            Qualifier::NonNull,
            list,
            vec![AnnotatedType::type_var(Qualifier::Unspecified, t)],
        );

        let mut subst = Substitution::new(
            &env,
            HashMap::from([(t, string_ty(&env, Qualifier::Nullable))]),
        );
        let out = subst.apply(&signature_ty);
        assert_eq!(
            out,
            AnnotatedType::parameterized(
                Qualifier::NonNull,
                list,
                vec![string_ty(&env, Qualifier::Nullable)],
            )
        );
        assert!(subst.take_contradictions().is_empty());
    }

    #[test]
    fn use_site_qualifier_wins_over_substituted_actual() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );

        // `@NonNull T` with T := unannotated String stays NonNull.
        let use_site = AnnotatedType::type_var(Qualifier::NonNull, t);
        let mut subst = Substitution::new(
            &env,
            HashMap::from([(t, string_ty(&env, Qualifier::Unspecified))]),
        );
        let out = subst.apply(&use_site);
        assert_eq!(out, string_ty(&env, Qualifier::NonNull));
        assert!(subst.take_contradictions().is_empty());
    }

    #[test]
    fn use_site_conflicting_with_declaration_records_a_contradiction() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        // `<@Nullable T>` used as `@NonNull T`.
        let t = env.add_type_param(
            "T",
            Qualifier::Nullable,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );

        let use_site = AnnotatedType::type_var(Qualifier::NonNull, t);
        let mut subst = Substitution::new(
            &env,
            HashMap::from([(t, string_ty(&env, Qualifier::Unspecified))]),
        );
        let out = subst.apply(&use_site);
        assert_eq!(out.qualifier, Qualifier::NonNull);
        assert_eq!(subst.take_contradictions(), vec![t]);
        // Draining resets.
        assert!(subst.take_contradictions().is_empty());
    }

    #[test]
    fn use_site_overriding_the_actual_is_not_a_contradiction() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );

        // `@Nullable T` with T := @NonNull String widens at the use site;
        // that is ordinary, not contradictory.
        let use_site = AnnotatedType::type_var(Qualifier::Nullable, t);
        let mut subst = Substitution::new(
            &env,
            HashMap::from([(t, string_ty(&env, Qualifier::NonNull))]),
        );
        let out = subst.apply(&use_site);
        assert_eq!(out, string_ty(&env, Qualifier::Nullable));
        assert!(subst.take_contradictions().is_empty());
    }

    #[test]
    fn unmapped_variables_survive_substitution() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );
        let use_site = AnnotatedType::type_var(Qualifier::Nullable, t);
        let mut subst = Substitution::new(&env, HashMap::new());
        assert_eq!(subst.apply(&use_site), use_site);
    }

    #[test]
    fn nonnull_parameter_rejects_nullable_actual() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::NonNull,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );
        let declared = env.type_param(t).unwrap().clone();

        let errors = check_binding(&env, &declared, &string_ty(&env, Qualifier::Nullable));
        assert_eq!(
            errors,
            vec![BindingError::QualifierMismatch {
                param: "T".to_string(),
                actual: "@Nullable String".to_string(),
            }]
        );
        assert!(errors[0]
            .to_string()
            .contains("is not a valid substitute for the type parameter 'T'"));
    }

    #[test]
    fn nonnull_parameter_flags_unannotated_actual_as_unchecked() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::NonNull,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );
        let declared = env.type_param(t).unwrap().clone();

        let errors = check_binding(&env, &declared, &string_ty(&env, Qualifier::Unspecified));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category(), DiagnosticCategory::Unchecked);
    }

    #[test]
    fn nullable_parameter_rejects_nonnull_actual() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Nullable,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );
        let declared = env.type_param(t).unwrap().clone();

        let errors = check_binding(&env, &declared, &string_ty(&env, Qualifier::NonNull));
        assert!(matches!(
            errors.as_slice(),
            [BindingError::QualifierMismatch { .. }]
        ));
    }

    #[test]
    fn annotated_bound_is_enforced() {
        let mut env = TypeStore::with_minimal_jdk();
        let number = env.lookup_class("java.lang.Number").unwrap();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::NonNull, number),
        );
        let declared = env.type_param(t).unwrap().clone();

        // `<T extends @NonNull Number>` rejects a @Nullable Integer.
        let integer = env.lookup_class("java.lang.Integer").unwrap();
        let errors = check_binding(
            &env,
            &declared,
            &AnnotatedType::leaf(Qualifier::Nullable, integer),
        );
        assert!(matches!(
            errors.as_slice(),
            [BindingError::BoundMismatch { .. }]
        ));

        // And accepts a @NonNull Integer.
        let errors = check_binding(
            &env,
            &declared,
            &AnnotatedType::leaf(Qualifier::NonNull, integer),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn instantiation_checks_nested_arguments() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let object_ty = AnnotatedType::leaf(Qualifier::Unspecified, object);
        let string = env.lookup_class("java.lang.String").unwrap();
        let list = env.lookup_class("java.util.List").unwrap();

        // class Box<@NonNull T> {}
        let t = env.add_type_param("T", Qualifier::NonNull, object_ty.clone());
        let box_class = env.add_class(nullity_types::ClassDef {
            name: "p.Box".to_string(),
            kind: nullity_types::ClassKind::Class,
            type_params: vec![t],
            super_class: Some(object_ty),
            interfaces: vec![],
        });

        // List<Box<@Nullable String>>: the violation sits one level down.
        let inner = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            box_class,
            vec![AnnotatedType::leaf(Qualifier::Nullable, string)],
        );
        let errors = check_instantiation(&env, list, std::slice::from_ref(&inner));
        assert!(matches!(
            errors.as_slice(),
            [BindingError::QualifierMismatch { .. }]
        ));
    }

    #[test]
    fn wildcard_arguments_are_not_substitutes() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let object_ty = AnnotatedType::leaf(Qualifier::Unspecified, object);
        let t = env.add_type_param("T", Qualifier::NonNull, object_ty.clone());
        let box_class = env.add_class(nullity_types::ClassDef {
            name: "p.Box".to_string(),
            kind: nullity_types::ClassKind::Class,
            type_params: vec![t],
            super_class: Some(object_ty),
            interfaces: vec![],
        });

        // Box<?> binds nothing; no error.
        let wild = AnnotatedType::wildcard(Qualifier::Unspecified, BoundKind::Unbounded, None);
        let errors = check_instantiation(&env, box_class, std::slice::from_ref(&wild));
        assert!(errors.is_empty());
    }

    #[test]
    fn binding_error_respects_severity_config() {
        let config = NullConfig::default();
        let err = BindingError::QualifierMismatch {
            param: "T".to_string(),
            actual: "@Nullable String".to_string(),
        };
        let diag = err.into_diagnostic(&config, Some(Span::new(3, 9))).unwrap();
        assert_eq!(diag.code, "NULL_BINDING");
    }
}
