//! The compatibility relation between a required and a provided annotated
//! type.
//!
//! Structural co-recursion over both trees, position by position. The host
//! type checker has already established that the shapes line up; this module
//! only judges nullness. Every position is visited and every violation is
//! recorded once, so a single declaration can legitimately produce several
//! findings.

use std::collections::{HashMap, HashSet, VecDeque};

use nullity_types::{
    AnnotatedType, BoundKind, ClassId, Diagnostic, DiagnosticCategory, NullConfig, PathStep,
    Qualifier, Shape, Span, TypeEnv, TypePath,
};
use tracing::trace;

use crate::subst::Substitution;

/// Outcome at a single position. Terminal: verdicts never transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    Exact,
    UncheckedWarning,
    Mismatch,
}

impl Verdict {
    fn worst(a: Verdict, b: Verdict) -> Verdict {
        a.max(b)
    }
}

/// One violated sub-position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: TypePath,
    pub verdict: Verdict,
    pub message: String,
}

/// All findings for one comparison site, plus renderings of both full types
/// for message construction.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub required_rendered: String,
    pub provided_rendered: String,
    pub findings: Vec<Finding>,
}

impl CheckOutcome {
    pub fn verdict(&self) -> Verdict {
        self.findings
            .iter()
            .fold(Verdict::Exact, |acc, f| Verdict::worst(acc, f.verdict))
    }

    pub fn is_exact(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Direction a position is compared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variance {
    /// Assignment direction: provided flows into required.
    Covariant,
    /// Type-argument position: both directions must hold.
    Invariant,
    /// `? super` bound: required flows into provided.
    Contravariant,
}

/// Decide whether `provided` may be used where `required` is expected.
pub fn check(env: &dyn TypeEnv, required: &AnnotatedType, provided: &AnnotatedType) -> CheckOutcome {
    let mut checker = Checker {
        env,
        findings: Vec::new(),
    };
    trace!(
        required = %required.render(env),
        provided = %provided.render(env),
        "nullness compatibility check"
    );
    checker.check_at(&TypePath::root(), required, provided, Variance::Covariant);
    CheckOutcome {
        required_rendered: required.render(env),
        provided_rendered: provided.render(env),
        findings: checker.findings,
    }
}

/// Decide whether a `null` literal may be used where `required` is expected.
///
/// Only the outermost position matters: `null` assigned to
/// `String @NonNull []` violates the outer dimension, not the elements.
pub fn check_null_literal(env: &dyn TypeEnv, required: &AnnotatedType) -> CheckOutcome {
    let required_rendered = required.render(env);
    let mut findings = Vec::new();

    match &required.shape {
        Shape::TypeVar(var)
            if !required.qualifier.is_specified()
                && required.effective_qualifier(env) == Qualifier::Unspecified =>
        {
            let name = env
                .type_param(*var)
                .map(|tp| tp.name.clone())
                .unwrap_or_else(|| "?".to_string());
            findings.push(Finding {
                path: TypePath::root(),
                verdict: Verdict::Mismatch,
                message: format!(
                    "Null type mismatch: the provided value null is not compatible \
                     to the free type variable '{name}'"
                ),
            });
        }
        Shape::Leaf(_)
        | Shape::Parameterized(..)
        | Shape::Array(_)
        | Shape::Wildcard { .. }
        | Shape::TypeVar(_) => {
            if required.effective_qualifier(env) == Qualifier::NonNull {
                findings.push(Finding {
                    path: TypePath::root(),
                    verdict: Verdict::Mismatch,
                    message: format!(
                        "Null type mismatch: required '{required_rendered}' but the \
                         provided value is null"
                    ),
                });
            }
        }
    }

    CheckOutcome {
        required_rendered,
        provided_rendered: "null".to_string(),
        findings,
    }
}

/// Turn an outcome into diagnostics under the session's severity settings.
pub fn outcome_to_diagnostics(
    config: &NullConfig,
    outcome: &CheckOutcome,
    span: Option<Span>,
) -> Vec<Diagnostic> {
    outcome
        .findings
        .iter()
        .filter_map(|finding| {
            let category = match finding.verdict {
                Verdict::Exact => return None,
                Verdict::UncheckedWarning => DiagnosticCategory::Unchecked,
                Verdict::Mismatch => DiagnosticCategory::Mismatch,
            };
            config.diagnostic(category, finding.message.clone(), span)
        })
        .collect()
}

struct Checker<'e> {
    env: &'e dyn TypeEnv,
    findings: Vec<Finding>,
}

impl<'e> Checker<'e> {
    fn check_at(
        &mut self,
        path: &TypePath,
        required: &AnnotatedType,
        provided: &AnnotatedType,
        variance: Variance,
    ) {
        // A provided expression whose static type *is* an unresolved type
        // parameter downgrades to qualifier-only reasoning, unless its own
        // declaration already pins the qualifier.
        if let Shape::TypeVar(var) = &provided.shape {
            if !same_type_var(required, *var) {
                self.check_free_type_var(path, required, provided, *var, variance);
                return;
            }
        }

        self.check_qualifiers(path, required, provided, variance);
        self.check_shapes(path, required, provided, variance);
    }

    /// Qualifier comparison at one position.
    fn check_qualifiers(
        &mut self,
        path: &TypePath,
        required: &AnnotatedType,
        provided: &AnnotatedType,
        variance: Variance,
    ) {
        let req_q = required.effective_qualifier(self.env);
        let prov_q = provided.effective_qualifier(self.env);
        let verdict = qualifier_verdict(variance, req_q, prov_q);
        if verdict == Verdict::Exact {
            return;
        }

        let req_render = required.render(self.env);
        let prov_render = provided.render(self.env);
        let message = match verdict {
            Verdict::Mismatch => format!(
                "Null type mismatch: required '{req_render}' but the provided \
                 type is '{prov_render}'"
            ),
            Verdict::UncheckedWarning => format!(
                "Null type safety: the expression of type '{prov_render}' needs \
                 unchecked conversion to conform to '{req_render}'"
            ),
            Verdict::Exact => unreachable!("exact verdicts are filtered above"),
        };
        self.findings.push(Finding {
            path: path.clone(),
            verdict,
            message,
        });
    }

    /// Provided side is a type-variable use and the required side is not the
    /// same variable: no structural relation exists, only qualifiers.
    fn check_free_type_var(
        &mut self,
        path: &TypePath,
        required: &AnnotatedType,
        provided: &AnnotatedType,
        var: nullity_types::TypeVarId,
        variance: Variance,
    ) {
        let prov_q = provided.effective_qualifier(self.env);
        if prov_q.is_specified() {
            // The variable's nullness is pinned; ordinary rules apply.
            self.check_qualifiers(path, required, provided, variance);
            return;
        }

        let req_q = required.effective_qualifier(self.env);
        if qualifier_verdict(variance, req_q, prov_q) == Verdict::Exact {
            return;
        }

        let name = self
            .env
            .type_param(var)
            .map(|tp| tp.name.clone())
            .unwrap_or_else(|| "?".to_string());
        let req_render = required.render(self.env);
        self.findings.push(Finding {
            path: path.clone(),
            verdict: Verdict::UncheckedWarning,
            message: format!(
                "Null type safety: required '{req_render}' but this expression has \
                 type '{name}', a free type variable that may represent a \
                 '@Nullable' type"
            ),
        });
    }

    /// Structural recursion. Every shape pair is named; adding a shape must
    /// break this match.
    fn check_shapes(
        &mut self,
        path: &TypePath,
        required: &AnnotatedType,
        provided: &AnnotatedType,
        variance: Variance,
    ) {
        match &required.shape {
            Shape::Leaf(_) => match &provided.shape {
                // Raw required accepts anything the host admitted.
                Shape::Leaf(_)
                | Shape::Parameterized(..)
                | Shape::Array(_)
                | Shape::TypeVar(_) => {}
                Shape::Wildcard { kind, bound } => {
                    self.check_provided_wildcard(path, required, *kind, bound.as_deref(), variance);
                }
            },

            Shape::Parameterized(req_class, req_args) => match &provided.shape {
                Shape::Parameterized(prov_class, prov_args) => {
                    if prov_class == req_class {
                        self.check_type_args(path, req_args, prov_args);
                    } else if let Some(projected) =
                        as_supertype(self.env, provided, *req_class)
                    {
                        match &projected.shape {
                            Shape::Parameterized(_, projected_args) => {
                                self.check_type_args(path, req_args, projected_args);
                            }
                            // Projection lost the arguments: treat like raw.
                            Shape::Leaf(_) => self.check_raw_provided(path, req_args, provided),
                            Shape::Array(_)
                            | Shape::Wildcard { .. }
                            | Shape::TypeVar(_) => {}
                        }
                    }
                    // No projection: the host's type error, not ours.
                }
                Shape::Leaf(prov_class) => {
                    let related = *prov_class == *req_class
                        || as_supertype(self.env, provided, *req_class).is_some();
                    if related {
                        self.check_raw_provided(path, req_args, provided);
                    }
                }
                Shape::Wildcard { kind, bound } => {
                    self.check_provided_wildcard(path, required, *kind, bound.as_deref(), variance);
                }
                Shape::Array(_) | Shape::TypeVar(_) => {}
            },

            Shape::Array(req_elem) => match &provided.shape {
                Shape::Array(prov_elem) => {
                    // Dimensions outer-to-inner; an outer violation never
                    // suppresses inner ones.
                    self.check_at(
                        &path.push(PathStep::ArrayElement),
                        req_elem,
                        prov_elem,
                        variance,
                    );
                }
                Shape::Wildcard { kind, bound } => {
                    self.check_provided_wildcard(path, required, *kind, bound.as_deref(), variance);
                }
                Shape::Leaf(_) | Shape::Parameterized(..) | Shape::TypeVar(_) => {}
            },

            Shape::Wildcard { kind, bound } => {
                let Some(bound) = bound else { return };
                let bound_path = path.push(PathStep::WildcardBound);
                match kind {
                    BoundKind::Extends => {
                        self.check_at(&bound_path, bound, provided, Variance::Covariant);
                    }
                    BoundKind::Super => {
                        self.check_at(&bound_path, bound, provided, Variance::Contravariant);
                    }
                    BoundKind::Unbounded => {}
                }
            }

            Shape::TypeVar(_) => match &provided.shape {
                // Same-variable case was handled in `check_at`; a concrete
                // provided type against a variable slot is qualifier-only,
                // which `check_qualifiers` already covered.
                Shape::Leaf(_)
                | Shape::Parameterized(..)
                | Shape::Array(_)
                | Shape::TypeVar(_) => {}
                Shape::Wildcard { kind, bound } => {
                    self.check_provided_wildcard(path, required, *kind, bound.as_deref(), variance);
                }
            },
        }
    }

    /// Type arguments of the same parameterization. The argument position is
    /// invariant unless the required argument is a wildcard, which shifts
    /// the comparison onto its bound with the matching variance.
    fn check_type_args(
        &mut self,
        path: &TypePath,
        req_args: &[AnnotatedType],
        prov_args: &[AnnotatedType],
    ) {
        for (i, (req_arg, prov_arg)) in req_args.iter().zip(prov_args).enumerate() {
            let arg_path = path.push(PathStep::TypeArgument(i));
            match &req_arg.shape {
                Shape::Wildcard { kind, bound } => {
                    let Some(bound) = bound else { continue };
                    let bound_path = arg_path.push(PathStep::WildcardBound);
                    match kind {
                        BoundKind::Extends => {
                            self.check_at(&bound_path, bound, prov_arg, Variance::Covariant);
                        }
                        BoundKind::Super => {
                            self.check_at(&bound_path, bound, prov_arg, Variance::Contravariant);
                        }
                        BoundKind::Unbounded => {}
                    }
                }
                Shape::Leaf(_)
                | Shape::Parameterized(..)
                | Shape::Array(_)
                | Shape::TypeVar(_) => {
                    self.check_at(&arg_path, req_arg, prov_arg, Variance::Invariant);
                }
            }
        }
    }

    /// Provided expression has a raw type where the required type is
    /// parameterized: every annotated required argument is only reachable
    /// through an unchecked conversion.
    fn check_raw_provided(
        &mut self,
        path: &TypePath,
        req_args: &[AnnotatedType],
        provided: &AnnotatedType,
    ) {
        let prov_render = provided.render(self.env);
        for (i, req_arg) in req_args.iter().enumerate() {
            if !has_specified_qualifier(req_arg) {
                continue;
            }
            let req_render = req_arg.render(self.env);
            self.findings.push(Finding {
                path: path.push(PathStep::TypeArgument(i)),
                verdict: Verdict::UncheckedWarning,
                message: format!(
                    "Null type safety: the expression of type '{prov_render}' needs \
                     unchecked conversion to conform to a type with argument \
                     '{req_render}'"
                ),
            });
        }
    }

    /// A wildcard on the provided side (captured value): its upper bound is
    /// the best static type the value is known to have.
    fn check_provided_wildcard(
        &mut self,
        path: &TypePath,
        required: &AnnotatedType,
        kind: BoundKind,
        bound: Option<&AnnotatedType>,
        variance: Variance,
    ) {
        match kind {
            BoundKind::Extends => {
                if let Some(bound) = bound {
                    self.check_shapes(path, required, bound, variance);
                }
            }
            // `? super X` / unbounded tell us nothing beyond the qualifier,
            // which was already compared.
            BoundKind::Super | BoundKind::Unbounded => {}
        }
    }
}

fn same_type_var(required: &AnnotatedType, var: nullity_types::TypeVarId) -> bool {
    matches!(&required.shape, Shape::TypeVar(req_var) if *req_var == var)
}

fn qualifier_verdict(variance: Variance, required: Qualifier, provided: Qualifier) -> Verdict {
    match variance {
        Variance::Covariant => covariant_verdict(required, provided),
        Variance::Contravariant => covariant_verdict(provided, required),
        Variance::Invariant => match (required, provided) {
            (Qualifier::NonNull, Qualifier::NonNull)
            | (Qualifier::Nullable, Qualifier::Nullable)
            | (Qualifier::Unspecified, Qualifier::Unspecified) => Verdict::Exact,
            (Qualifier::NonNull, Qualifier::Nullable)
            | (Qualifier::Nullable, Qualifier::NonNull) => Verdict::Mismatch,
            (Qualifier::NonNull | Qualifier::Nullable, Qualifier::Unspecified)
            | (Qualifier::Unspecified, Qualifier::NonNull | Qualifier::Nullable) => {
                Verdict::UncheckedWarning
            }
        },
    }
}

fn covariant_verdict(required: Qualifier, provided: Qualifier) -> Verdict {
    match (required, provided) {
        // Widening is always safe; an unspecified requirement accepts anything.
        (
            Qualifier::Nullable | Qualifier::Unspecified,
            Qualifier::NonNull | Qualifier::Nullable | Qualifier::Unspecified,
        ) => Verdict::Exact,
        (Qualifier::NonNull, Qualifier::NonNull) => Verdict::Exact,
        (Qualifier::NonNull, Qualifier::Nullable) => Verdict::Mismatch,
        (Qualifier::NonNull, Qualifier::Unspecified) => Verdict::UncheckedWarning,
    }
}

fn has_specified_qualifier(ty: &AnnotatedType) -> bool {
    if ty.qualifier.is_specified() {
        return true;
    }
    match &ty.shape {
        Shape::Leaf(_) | Shape::TypeVar(_) => false,
        Shape::Parameterized(_, args) => args.iter().any(has_specified_qualifier),
        Shape::Array(elem) => has_specified_qualifier(elem),
        Shape::Wildcard { bound, .. } => {
            bound.as_deref().is_some_and(has_specified_qualifier)
        }
    }
}

/// View `ty` as an instantiation of `target` by walking the supertype graph
/// and substituting type arguments along the way, carrying qualifiers.
///
/// Breadth-first, superclass edge before interface edges: when several
/// intermediate parameterizations could supply the target, the closest
/// declaration in the hierarchy wins. Best-effort: missing class metadata
/// returns `None`.
pub fn as_supertype(
    env: &dyn TypeEnv,
    ty: &AnnotatedType,
    target: ClassId,
) -> Option<AnnotatedType> {
    let (root_class, root_args) = match &ty.shape {
        Shape::Leaf(id) => (*id, Vec::new()),
        Shape::Parameterized(id, args) => (*id, args.clone()),
        Shape::Array(_) | Shape::Wildcard { .. } | Shape::TypeVar(_) => return None,
    };

    let mut queue: VecDeque<AnnotatedType> = VecDeque::new();
    let mut seen: HashSet<AnnotatedType> = HashSet::new();
    queue.push_back(class_ref(ty.qualifier, root_class, root_args));

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let (class, args) = match &current.shape {
            Shape::Leaf(id) => (*id, &[][..]),
            Shape::Parameterized(id, args) => (*id, args.as_slice()),
            Shape::Array(_) | Shape::Wildcard { .. } | Shape::TypeVar(_) => continue,
        };

        if class == target {
            return Some(current.with_qualifier(ty.qualifier));
        }

        let def = env.class(class)?;

        // A raw instantiation of a generic class cannot recover arguments
        // for its supertypes; keep walking rawly.
        if args.is_empty() && !def.type_params.is_empty() {
            if let Some(sc) = &def.super_class {
                if let Some(id) = sc.class_id() {
                    queue.push_back(AnnotatedType::leaf(sc.qualifier, id));
                }
            }
            for iface in &def.interfaces {
                if let Some(id) = iface.class_id() {
                    queue.push_back(AnnotatedType::leaf(iface.qualifier, id));
                }
            }
            continue;
        }

        let mut map: HashMap<nullity_types::TypeVarId, AnnotatedType> =
            HashMap::with_capacity(def.type_params.len());
        for (idx, formal) in def.type_params.iter().copied().enumerate() {
            if let Some(actual) = args.get(idx) {
                map.insert(formal, actual.clone());
            }
        }
        let mut subst = Substitution::new(env, map);

        if let Some(sc) = &def.super_class {
            queue.push_back(subst.apply(sc));
        }
        for iface in &def.interfaces {
            queue.push_back(subst.apply(iface));
        }
    }

    None
}

fn class_ref(qualifier: Qualifier, class: ClassId, args: Vec<AnnotatedType>) -> AnnotatedType {
    if args.is_empty() {
        AnnotatedType::leaf(qualifier, class)
    } else {
        AnnotatedType::parameterized(qualifier, class, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nullity_types::TypeStore;

    fn string_ty(env: &TypeStore, q: Qualifier) -> AnnotatedType {
        AnnotatedType::leaf(q, env.lookup_class("java.lang.String").unwrap())
    }

    #[test]
    fn widening_is_exact() {
        let env = TypeStore::with_minimal_jdk();
        let required = string_ty(&env, Qualifier::Nullable);
        let provided = string_ty(&env, Qualifier::NonNull);
        assert!(check(&env, &required, &provided).is_exact());
    }

    #[test]
    fn narrowing_is_a_mismatch() {
        let env = TypeStore::with_minimal_jdk();
        let required = string_ty(&env, Qualifier::NonNull);
        let provided = string_ty(&env, Qualifier::Nullable);
        let outcome = check(&env, &required, &provided);
        assert_eq!(outcome.verdict(), Verdict::Mismatch);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].path.is_root());
    }

    #[test]
    fn unspecified_source_needs_unchecked_conversion() {
        let env = TypeStore::with_minimal_jdk();
        let required = string_ty(&env, Qualifier::NonNull);
        let provided = string_ty(&env, Qualifier::Unspecified);
        assert_eq!(
            check(&env, &required, &provided).verdict(),
            Verdict::UncheckedWarning
        );
    }

    #[test]
    fn invariant_type_argument_rejects_widening() {
        let env = TypeStore::with_minimal_jdk();
        let list = env.lookup_class("java.util.List").unwrap();

        // List<@Nullable String> is not a List<@NonNull String>, in either
        // direction.
        let required = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::NonNull)],
        );
        let provided = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::Nullable)],
        );
        assert_eq!(check(&env, &required, &provided).verdict(), Verdict::Mismatch);
        assert_eq!(check(&env, &provided, &required).verdict(), Verdict::Mismatch);
    }

    #[test]
    fn extends_wildcard_accepts_covariant_argument() {
        let env = TypeStore::with_minimal_jdk();
        let list = env.lookup_class("java.util.List").unwrap();

        // List<? extends @Nullable String> accepts a @NonNull String argument.
        let required = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![AnnotatedType::wildcard(
                Qualifier::Unspecified,
                BoundKind::Extends,
                Some(string_ty(&env, Qualifier::Nullable)),
            )],
        );
        let provided = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::NonNull)],
        );
        assert!(check(&env, &required, &provided).is_exact());
    }

    #[test]
    fn super_wildcard_checks_contravariantly() {
        let env = TypeStore::with_minimal_jdk();
        let list = env.lookup_class("java.util.List").unwrap();

        // List<? super @NonNull String> accepts List<@Nullable String>:
        // the provided argument only needs to *accept* non-null strings.
        let required = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![AnnotatedType::wildcard(
                Qualifier::Unspecified,
                BoundKind::Super,
                Some(string_ty(&env, Qualifier::NonNull)),
            )],
        );
        let provided = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::Nullable)],
        );
        assert!(check(&env, &required, &provided).is_exact());

        // But not the other way around: a List<@NonNull String> required
        // through `? super @Nullable String` would demand Nullable flow into
        // NonNull.
        let required = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![AnnotatedType::wildcard(
                Qualifier::Unspecified,
                BoundKind::Super,
                Some(string_ty(&env, Qualifier::Nullable)),
            )],
        );
        let provided = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::NonNull)],
        );
        assert_eq!(check(&env, &required, &provided).verdict(), Verdict::Mismatch);
    }

    #[test]
    fn supertype_projection_carries_type_arguments() {
        let env = TypeStore::with_minimal_jdk();
        let list = env.lookup_class("java.util.List").unwrap();
        let array_list = env.lookup_class("java.util.ArrayList").unwrap();

        let projected = as_supertype(
            &env,
            &AnnotatedType::parameterized(
                Qualifier::Unspecified,
                array_list,
                vec![string_ty(&env, Qualifier::NonNull)],
            ),
            list,
        )
        .expect("ArrayList<T> should project onto List<T>");
        assert_eq!(
            projected.shape,
            Shape::Parameterized(list, vec![string_ty(&env, Qualifier::NonNull)])
        );
    }

    #[test]
    fn projection_reaches_indirect_interfaces() {
        let env = TypeStore::with_minimal_jdk();
        let collection = env.lookup_class("java.util.Collection").unwrap();
        let array_list = env.lookup_class("java.util.ArrayList").unwrap();

        // ArrayList -> List -> Collection.
        let projected = as_supertype(
            &env,
            &AnnotatedType::parameterized(
                Qualifier::Unspecified,
                array_list,
                vec![string_ty(&env, Qualifier::Nullable)],
            ),
            collection,
        )
        .unwrap();
        assert_eq!(
            projected.shape,
            Shape::Parameterized(collection, vec![string_ty(&env, Qualifier::Nullable)])
        );
    }

    #[test]
    fn mismatch_detected_through_supertype_projection() {
        let env = TypeStore::with_minimal_jdk();
        let list = env.lookup_class("java.util.List").unwrap();
        let array_list = env.lookup_class("java.util.ArrayList").unwrap();

        let required = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::NonNull)],
        );
        let provided = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            array_list,
            vec![string_ty(&env, Qualifier::Nullable)],
        );
        let outcome = check(&env, &required, &provided);
        assert_eq!(outcome.verdict(), Verdict::Mismatch);
        assert_eq!(
            outcome.findings[0].path.steps(),
            &[PathStep::TypeArgument(0)]
        );
    }

    #[test]
    fn raw_provided_flags_each_annotated_argument() {
        let env = TypeStore::with_minimal_jdk();
        let list = env.lookup_class("java.util.List").unwrap();
        let array_list = env.lookup_class("java.util.ArrayList").unwrap();

        let required = AnnotatedType::parameterized(
            Qualifier::Unspecified,
            list,
            vec![string_ty(&env, Qualifier::NonNull)],
        );
        let provided = AnnotatedType::leaf(Qualifier::Unspecified, array_list);
        let outcome = check(&env, &required, &provided);
        assert_eq!(outcome.verdict(), Verdict::UncheckedWarning);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn all_array_dimensions_are_checked_independently() {
        let env = TypeStore::with_minimal_jdk();

        // required: String @NonNull [] @NonNull [] with @NonNull elements
        // provided: String @Nullable [] @Nullable [] with @Nullable elements
        // => three independent findings.
        let required = AnnotatedType::array(
            Qualifier::NonNull,
            AnnotatedType::array(Qualifier::NonNull, string_ty(&env, Qualifier::NonNull)),
        );
        let provided = AnnotatedType::array(
            Qualifier::Nullable,
            AnnotatedType::array(Qualifier::Nullable, string_ty(&env, Qualifier::Nullable)),
        );
        let outcome = check(&env, &required, &provided);
        assert_eq!(outcome.findings.len(), 3);
        assert!(outcome
            .findings
            .iter()
            .all(|f| f.verdict == Verdict::Mismatch));
    }

    #[test]
    fn null_literal_violates_outer_dimension_only() {
        let env = TypeStore::with_minimal_jdk();
        let required = AnnotatedType::array(
            Qualifier::NonNull,
            AnnotatedType::array(
                Qualifier::Nullable,
                string_ty(&env, Qualifier::NonNull),
            ),
        );
        let outcome = check_null_literal(&env, &required);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].path.is_root());

        // Same array with a nullable outer dimension accepts null outright.
        let required = AnnotatedType::array(
            Qualifier::Nullable,
            AnnotatedType::array(Qualifier::NonNull, string_ty(&env, Qualifier::NonNull)),
        );
        assert!(check_null_literal(&env, &required).is_exact());
    }

    #[test]
    fn null_literal_against_free_type_variable_names_the_variable() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );

        let required = AnnotatedType::type_var(Qualifier::Unspecified, t);
        let outcome = check_null_literal(&env, &required);
        assert_eq!(outcome.verdict(), Verdict::Mismatch);
        assert!(outcome.findings[0].message.contains("free type variable 'T'"));
        assert!(!outcome.findings[0].message.contains("NonNull"));
    }

    #[test]
    fn free_type_variable_expression_downgrades_to_warning() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Unspecified,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );

        let required = AnnotatedType::leaf(Qualifier::NonNull, object);
        let provided = AnnotatedType::type_var(Qualifier::Unspecified, t);
        let outcome = check(&env, &required, &provided);
        assert_eq!(outcome.verdict(), Verdict::UncheckedWarning);
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].message.contains("'T'"));
    }

    #[test]
    fn pinned_type_variable_follows_ordinary_rules() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Nullable,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );

        let required = AnnotatedType::leaf(Qualifier::NonNull, object);
        let provided = AnnotatedType::type_var(Qualifier::Unspecified, t);
        assert_eq!(check(&env, &required, &provided).verdict(), Verdict::Mismatch);
    }

    #[test]
    fn null_literal_respects_declared_nullable_variable() {
        let mut env = TypeStore::with_minimal_jdk();
        let object = env.object_class();
        let t = env.add_type_param(
            "T",
            Qualifier::Nullable,
            AnnotatedType::leaf(Qualifier::Unspecified, object),
        );
        let required = AnnotatedType::type_var(Qualifier::Unspecified, t);
        assert!(check_null_literal(&env, &required).is_exact());
    }

    #[test]
    fn outcome_to_diagnostics_maps_categories() {
        let env = TypeStore::with_minimal_jdk();
        let config = NullConfig::default();
        let required = string_ty(&env, Qualifier::NonNull);
        let provided = string_ty(&env, Qualifier::Nullable);
        let outcome = check(&env, &required, &provided);
        let diags = outcome_to_diagnostics(&config, &outcome, Some(Span::new(0, 4)));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "NULL_MISMATCH");
    }
}
