use serde::{Deserialize, Serialize};

/// Nullness of a single type-use position.
///
/// `Unspecified` is legacy code without an annotation and without an
/// applicable default. It is compatible with both directions, but only via an
/// unchecked conversion, never silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    NonNull,
    Nullable,
    Unspecified,
}

impl Qualifier {
    pub fn is_specified(self) -> bool {
        self != Self::Unspecified
    }

    /// Combine an explicit annotation with the applicable scope default.
    ///
    /// The explicit annotation always wins. Writing an annotation equal to the
    /// default is legal but flagged as redundant (informational, not an
    /// error).
    #[must_use]
    pub fn merge_declaration(explicit: Option<Qualifier>, default: Qualifier) -> Merged {
        match explicit {
            Some(q) => Merged {
                qualifier: q,
                redundant: q == default && q.is_specified(),
            },
            None => Merged {
                qualifier: default,
                redundant: false,
            },
        }
    }

    /// True iff `a` and `b` are contradictory nullness requirements.
    ///
    /// This is the "contradictory null specification" condition: `NonNull` and
    /// `Nullable` reachable for one position from independent sources. It is a
    /// hard error at the declaration, distinct from any compatibility
    /// mismatch between two positions.
    pub fn conflict(a: Qualifier, b: Qualifier) -> bool {
        matches!(
            (a, b),
            (Qualifier::NonNull, Qualifier::Nullable) | (Qualifier::Nullable, Qualifier::NonNull)
        )
    }
}

/// Result of merging an explicit annotation with a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merged {
    pub qualifier: Qualifier,
    pub redundant: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_wins_over_default() {
        let merged = Qualifier::merge_declaration(Some(Qualifier::Nullable), Qualifier::NonNull);
        assert_eq!(merged.qualifier, Qualifier::Nullable);
        assert!(!merged.redundant);
    }

    #[test]
    fn missing_annotation_takes_default() {
        let merged = Qualifier::merge_declaration(None, Qualifier::NonNull);
        assert_eq!(merged.qualifier, Qualifier::NonNull);
        assert!(!merged.redundant);
    }

    #[test]
    fn explicit_equal_to_default_is_redundant() {
        let merged = Qualifier::merge_declaration(Some(Qualifier::NonNull), Qualifier::NonNull);
        assert_eq!(merged.qualifier, Qualifier::NonNull);
        assert!(merged.redundant);
    }

    #[test]
    fn unspecified_is_never_redundant() {
        let merged =
            Qualifier::merge_declaration(Some(Qualifier::Unspecified), Qualifier::Unspecified);
        assert!(!merged.redundant);
    }

    #[test]
    fn conflict_requires_both_directions() {
        assert!(Qualifier::conflict(Qualifier::NonNull, Qualifier::Nullable));
        assert!(Qualifier::conflict(Qualifier::Nullable, Qualifier::NonNull));
        assert!(!Qualifier::conflict(Qualifier::NonNull, Qualifier::NonNull));
        assert!(!Qualifier::conflict(Qualifier::NonNull, Qualifier::Unspecified));
        assert!(!Qualifier::conflict(
            Qualifier::Unspecified,
            Qualifier::Unspecified
        ));
    }
}
