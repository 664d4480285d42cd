//! Annotated type descriptors.
//!
//! An `AnnotatedType` is the host's structural type with a nullness
//! qualifier attached at every position: the leaf class, each array
//! dimension, each type argument, each wildcard bound. Trees are immutable
//! after resolution; substitution builds new trees.

use crate::qualifier::Qualifier;
use crate::types::{ClassId, TypeEnv, TypeVarId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotatedType {
    pub qualifier: Qualifier,
    pub shape: Shape,
}

/// The structural part of an annotated type.
///
/// Every recursion over a `Shape` matches all variants explicitly. Do not add
/// wildcard arms: a new shape must fail to compile until every checker
/// handles it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Raw or non-generic nominal reference.
    Leaf(ClassId),
    /// `List<String>` and friends.
    Parameterized(ClassId, Vec<AnnotatedType>),
    /// One array dimension; the node's own qualifier is that dimension's.
    /// `String @Nullable [] @NonNull []` is
    /// `Array(q=NonNull, Array(q=Nullable, Leaf(String)))`.
    Array(Box<AnnotatedType>),
    /// `?`, `? extends T`, `? super T`.
    Wildcard {
        kind: BoundKind,
        bound: Option<Box<AnnotatedType>>,
    },
    /// Use of a declared type parameter. Its own qualifier and bound live in
    /// the `TypeParamDecl` reachable through the env.
    TypeVar(TypeVarId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Extends,
    Super,
    Unbounded,
}

impl AnnotatedType {
    pub fn leaf(qualifier: Qualifier, class: ClassId) -> Self {
        Self {
            qualifier,
            shape: Shape::Leaf(class),
        }
    }

    pub fn parameterized(qualifier: Qualifier, class: ClassId, args: Vec<AnnotatedType>) -> Self {
        Self {
            qualifier,
            shape: Shape::Parameterized(class, args),
        }
    }

    pub fn array(qualifier: Qualifier, element: AnnotatedType) -> Self {
        Self {
            qualifier,
            shape: Shape::Array(Box::new(element)),
        }
    }

    pub fn wildcard(qualifier: Qualifier, kind: BoundKind, bound: Option<AnnotatedType>) -> Self {
        Self {
            qualifier,
            shape: Shape::Wildcard {
                kind,
                bound: bound.map(Box::new),
            },
        }
    }

    pub fn type_var(qualifier: Qualifier, var: TypeVarId) -> Self {
        Self {
            qualifier,
            shape: Shape::TypeVar(var),
        }
    }

    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// The nominal class at the root, if the root is a class reference.
    pub fn class_id(&self) -> Option<ClassId> {
        match &self.shape {
            Shape::Leaf(id) | Shape::Parameterized(id, _) => Some(*id),
            Shape::Array(_) | Shape::Wildcard { .. } | Shape::TypeVar(_) => None,
        }
    }

    /// The qualifier that governs a use of this type.
    ///
    /// For a type variable use, an explicit use-site qualifier wins;
    /// otherwise the variable's own declared qualifier applies. Everything
    /// else answers its written qualifier.
    pub fn effective_qualifier(&self, env: &dyn TypeEnv) -> Qualifier {
        match &self.shape {
            Shape::TypeVar(var) if !self.qualifier.is_specified() => env
                .type_param(*var)
                .map(|tp| tp.qualifier)
                .unwrap_or(Qualifier::Unspecified),
            Shape::Leaf(_)
            | Shape::Parameterized(..)
            | Shape::Array(_)
            | Shape::Wildcard { .. }
            | Shape::TypeVar(_) => self.qualifier,
        }
    }

    /// True if this is exactly a raw/unparameterized `java.lang.Object`
    /// reference (the implicit top bound of a type parameter).
    pub fn is_top_object(&self, env: &dyn TypeEnv) -> bool {
        matches!(&self.shape, Shape::Leaf(id) if *id == env.object_class())
    }

    /// Java-ish rendering used in diagnostics, e.g.
    /// `@NonNull List<@Nullable String>`.
    pub fn render(&self, env: &dyn TypeEnv) -> String {
        let mut out = String::new();
        self.render_into(env, &mut out);
        out
    }

    fn render_into(&self, env: &dyn TypeEnv, out: &mut String) {
        match &self.shape {
            Shape::Array(element) => {
                element.render_into(env, out);
                out.push(' ');
                push_qualifier_prefix(self.qualifier, out);
                out.push_str("[]");
            }
            Shape::Leaf(id) => {
                push_qualifier_prefix(self.qualifier, out);
                out.push_str(simple_name(env.class_name(*id)));
            }
            Shape::Parameterized(id, args) => {
                push_qualifier_prefix(self.qualifier, out);
                out.push_str(simple_name(env.class_name(*id)));
                out.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.render_into(env, out);
                }
                out.push('>');
            }
            Shape::Wildcard { kind, bound } => {
                push_qualifier_prefix(self.qualifier, out);
                out.push('?');
                if let Some(bound) = bound {
                    match kind {
                        BoundKind::Extends => out.push_str(" extends "),
                        BoundKind::Super => out.push_str(" super "),
                        BoundKind::Unbounded => {}
                    }
                    bound.render_into(env, out);
                }
            }
            Shape::TypeVar(var) => {
                push_qualifier_prefix(self.qualifier, out);
                let name = env.type_param(*var).map(|tp| tp.name.as_str()).unwrap_or("?");
                out.push_str(name);
            }
        }
    }
}

fn push_qualifier_prefix(qualifier: Qualifier, out: &mut String) {
    match qualifier {
        Qualifier::NonNull => out.push_str("@NonNull "),
        Qualifier::Nullable => out.push_str("@Nullable "),
        Qualifier::Unspecified => {}
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// The syntactic position a type (and potentially a qualifier) is written at.
///
/// Qualifiers are only legal at type-use positions. Writing one anywhere else
/// is a purely syntactic error, independent of compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Parameter,
    ReturnType,
    Field,
    Local,
    TypeParameter,
    TypeBound,
    TypeArgument,
    ArrayContents,
    /// Explicit receiver declaration (`void m(Foo this)`).
    Receiver,
    /// Exception type in a `catch` clause.
    CatchException,
    /// Right operand of `instanceof`.
    InstanceofOperand,
    /// Cast applied to a scalar (primitive) expression.
    ScalarCast,
    /// Type name in a `new` expression.
    AllocationName,
}

impl PositionKind {
    /// Whether the grammar admits a nullness annotation here at all.
    pub fn admits_annotation(self) -> bool {
        match self {
            PositionKind::Parameter
            | PositionKind::ReturnType
            | PositionKind::Field
            | PositionKind::Local
            | PositionKind::TypeParameter
            | PositionKind::TypeBound
            | PositionKind::TypeArgument
            | PositionKind::ArrayContents => true,
            PositionKind::Receiver
            | PositionKind::CatchException
            | PositionKind::InstanceofOperand
            | PositionKind::ScalarCast
            | PositionKind::AllocationName => false,
        }
    }
}

/// One step into an annotated type tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    TypeArgument(usize),
    ArrayElement,
    WildcardBound,
}

/// Path from the root of a compared type to the sub-position a finding is
/// about. Empty means the top-level position itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePath(Vec<PathStep>);

impl TypePath {
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn describe(&self) -> String {
        if self.0.is_empty() {
            return "top-level type".to_string();
        }
        let mut parts = Vec::with_capacity(self.0.len());
        for step in &self.0 {
            parts.push(match step {
                PathStep::TypeArgument(i) => format!("type argument {i}"),
                PathStep::ArrayElement => "array element".to_string(),
                PathStep::WildcardBound => "wildcard bound".to_string(),
            });
        }
        parts.join(" > ")
    }
}
