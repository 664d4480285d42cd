//! Scoped nullness defaulting.
//!
//! A source unit can declare an ambient nullness policy (`@NullMarked`,
//! `@NonNullByDefault({PARAMETER, RETURN_TYPE})`, ...) without annotating
//! every position. Scopes nest module -> type -> method -> local; each scope
//! holds only its own delta plus a link to its parent, so extending a scope
//! never mutates the enclosing one.

use std::sync::Arc;

use nullity_types::{
    AnnotatedType, Diagnostic, DiagnosticCategory, Merged, NullConfig, PositionKind, Qualifier,
    Span, TypeEnv,
};

/// Location kinds a default scope can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultLocation {
    Parameter,
    ReturnType,
    Field,
    TypeParameter,
    TypeBound,
    TypeArgument,
    ArrayContents,
}

impl DefaultLocation {
    const ALL: [DefaultLocation; 7] = [
        DefaultLocation::Parameter,
        DefaultLocation::ReturnType,
        DefaultLocation::Field,
        DefaultLocation::TypeParameter,
        DefaultLocation::TypeBound,
        DefaultLocation::TypeArgument,
        DefaultLocation::ArrayContents,
    ];

    fn bit(self) -> u8 {
        match self {
            DefaultLocation::Parameter => 1 << 0,
            DefaultLocation::ReturnType => 1 << 1,
            DefaultLocation::Field => 1 << 2,
            DefaultLocation::TypeParameter => 1 << 3,
            DefaultLocation::TypeBound => 1 << 4,
            DefaultLocation::TypeArgument => 1 << 5,
            DefaultLocation::ArrayContents => 1 << 6,
        }
    }
}

/// A small set of `DefaultLocation`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocationSet(u8);

impl LocationSet {
    pub const EMPTY: LocationSet = LocationSet(0);

    pub fn all() -> Self {
        Self::of(&DefaultLocation::ALL)
    }

    pub fn of(locations: &[DefaultLocation]) -> Self {
        let mut set = Self::EMPTY;
        for loc in locations {
            set.0 |= loc.bit();
        }
        set
    }

    pub fn contains(self, location: DefaultLocation) -> bool {
        self.0 & location.bit() != 0
    }

    pub fn is_subset(self, other: LocationSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = DefaultLocation> {
        DefaultLocation::ALL
            .into_iter()
            .filter(move |loc| self.contains(*loc))
    }
}

/// One level of the ambient-default stack.
///
/// Scopes are shared immutably: a nested declaration extends its parent by
/// allocating a child node, and concurrent workers may read a scope chain
/// without locking.
#[derive(Debug)]
pub struct DefaultScope {
    qualifier: Qualifier,
    locations: LocationSet,
    parent: Option<Arc<DefaultScope>>,
}

impl DefaultScope {
    /// A top-level scope (e.g. from a module or package annotation).
    pub fn root(qualifier: Qualifier, locations: LocationSet) -> Arc<Self> {
        Arc::new(Self {
            qualifier,
            locations,
            parent: None,
        })
    }

    /// A nested scope; the parent stays untouched.
    pub fn extend(
        self: &Arc<Self>,
        qualifier: Qualifier,
        locations: LocationSet,
    ) -> Arc<DefaultScope> {
        Arc::new(DefaultScope {
            qualifier,
            locations,
            parent: Some(Arc::clone(self)),
        })
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    pub fn locations(&self) -> LocationSet {
        self.locations
    }

    /// Innermost-out resolution: the first scope whose location set covers
    /// `location` decides; `Unspecified` when no scope applies.
    pub fn resolve(&self, location: DefaultLocation) -> Qualifier {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if s.locations.contains(location) {
                return s.qualifier;
            }
            scope = s.parent.as_deref();
        }
        Qualifier::Unspecified
    }

    /// Resolve the default for a syntactic position.
    ///
    /// Receiver types, catch exceptions, `instanceof` operands, scalar casts
    /// and allocation names are never defaultable, regardless of scope. A
    /// type parameter's own upper bound answers to `TypeBound` only, never
    /// `TypeArgument`.
    pub fn resolve_position(&self, position: PositionKind) -> Qualifier {
        match default_location_for(position) {
            Some(location) => self.resolve(location),
            None => Qualifier::Unspecified,
        }
    }

    /// True when this scope's effective contribution is already implied by
    /// its enclosing chain: every location it names resolves to the same
    /// qualifier without it. Reported, not an error.
    pub fn is_redundant(&self) -> bool {
        let Some(parent) = self.parent.as_deref() else {
            return self.locations.is_empty();
        };
        self.locations
            .iter()
            .all(|loc| parent.resolve(loc) == self.qualifier)
    }
}

fn default_location_for(position: PositionKind) -> Option<DefaultLocation> {
    match position {
        PositionKind::Parameter => Some(DefaultLocation::Parameter),
        PositionKind::ReturnType => Some(DefaultLocation::ReturnType),
        PositionKind::Field | PositionKind::Local => Some(DefaultLocation::Field),
        PositionKind::TypeParameter => Some(DefaultLocation::TypeParameter),
        PositionKind::TypeBound => Some(DefaultLocation::TypeBound),
        PositionKind::TypeArgument => Some(DefaultLocation::TypeArgument),
        PositionKind::ArrayContents => Some(DefaultLocation::ArrayContents),
        PositionKind::Receiver
        | PositionKind::CatchException
        | PositionKind::InstanceofOperand
        | PositionKind::ScalarCast
        | PositionKind::AllocationName => None,
    }
}

/// Merge an explicit qualifier with the scope default applicable at
/// `position`. Explicit always wins; agreement flags redundancy.
#[must_use]
pub fn apply_default(
    explicit: Option<Qualifier>,
    scope: Option<&DefaultScope>,
    position: PositionKind,
) -> Merged {
    let default = scope
        .map(|s| s.resolve_position(position))
        .unwrap_or(Qualifier::Unspecified);
    Qualifier::merge_declaration(explicit, default)
}

/// Defaulting for a type parameter's declared upper bound.
///
/// An explicit bound of exactly `java.lang.Object` is not affected by a
/// `TypeBound` default; annotating it explicitly is flagged redundant since
/// the annotation would be a no-op on the implicit top bound.
#[must_use]
pub fn apply_bound_default(
    env: &dyn TypeEnv,
    explicit: Option<Qualifier>,
    scope: Option<&DefaultScope>,
    bound: &AnnotatedType,
) -> Merged {
    if bound.is_top_object(env) {
        return Merged {
            qualifier: explicit.unwrap_or(Qualifier::Unspecified),
            redundant: explicit.is_some_and(|q| q.is_specified()),
        };
    }
    apply_default(explicit, scope, PositionKind::TypeBound)
}

/// A qualifier written where the grammar admits no type-use annotation
/// (receiver, catch exception, `instanceof` operand, scalar cast,
/// allocation name) is rejected outright, before any compatibility check.
pub fn check_annotation_location(
    config: &NullConfig,
    position: PositionKind,
    explicit: Option<Qualifier>,
    span: Option<Span>,
) -> Option<Diagnostic> {
    let qualifier = explicit.filter(|q| q.is_specified())?;
    if position.admits_annotation() {
        return None;
    }
    let name = match qualifier {
        Qualifier::NonNull => "@NonNull",
        Qualifier::Nullable => "@Nullable",
        Qualifier::Unspecified => return None,
    };
    config.diagnostic(
        DiagnosticCategory::IllegalLocation,
        format!("The nullness annotation '{name}' is not applicable at this location"),
        span,
    )
}
