//! The host type seam.
//!
//! The checker does not resolve Java types itself; the host resolver hands it
//! nominal class identities, supertype edges, and declared type parameters.
//! `TypeStore` is the in-memory environment used by the driver and by tests.

use std::collections::HashMap;

use crate::annotated::AnnotatedType;
use crate::qualifier::Qualifier;

/// Dense id of an interned class or interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Dense id of a declared type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

/// Structural facts about a class, as provided by the host resolver.
///
/// Supertype references are annotated types so that qualifiers written on
/// `extends`/`implements` clauses survive supertype projection.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<AnnotatedType>,
    pub interfaces: Vec<AnnotatedType>,
}

/// A type parameter declaration: `<@NonNull T extends Number>`.
///
/// The parameter's own qualifier constrains every actual type argument
/// substituted for it, independent of qualifiers written at individual use
/// sites of `T`.
#[derive(Debug, Clone)]
pub struct TypeParamDecl {
    pub name: String,
    pub qualifier: Qualifier,
    pub bound: AnnotatedType,
}

/// Read access to the host type structure.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDecl>;
    /// `java.lang.Object`, the top reference type.
    fn object_class(&self) -> ClassId;

    fn class_name(&self, id: ClassId) -> &str {
        self.class(id).map(|c| c.name.as_str()).unwrap_or("<unknown>")
    }
}

/// In-memory `TypeEnv` implementation.
#[derive(Debug, Default)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDecl>,
}

impl TypeStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        store.add_class(ClassDef {
            name: "java.lang.Object".to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
        });
        store
    }

    /// A store pre-seeded with the handful of JDK types the tests lean on.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        let object = store.object_class();
        let object_ty = AnnotatedType::leaf(Qualifier::Unspecified, object);

        for name in ["java.lang.String", "java.lang.Number"] {
            store.add_class(ClassDef {
                name: name.to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object_ty.clone()),
                interfaces: vec![],
            });
        }

        let number = store.lookup_class("java.lang.Number").unwrap();
        store.add_class(ClassDef {
            name: "java.lang.Integer".to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: Some(AnnotatedType::leaf(Qualifier::Unspecified, number)),
            interfaces: vec![],
        });

        // Collection<E>, List<E> extends Collection<E>, ArrayList<E> implements List<E>.
        let collection_e = store.add_type_param("E", Qualifier::Unspecified, object_ty.clone());
        let collection = store.add_class(ClassDef {
            name: "java.util.Collection".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![collection_e],
            super_class: None,
            interfaces: vec![],
        });

        let list_e = store.add_type_param("E", Qualifier::Unspecified, object_ty.clone());
        let list = store.add_class(ClassDef {
            name: "java.util.List".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![list_e],
            super_class: None,
            interfaces: vec![AnnotatedType::parameterized(
                Qualifier::Unspecified,
                collection,
                vec![AnnotatedType::type_var(Qualifier::Unspecified, list_e)],
            )],
        });

        let array_list_e = store.add_type_param("E", Qualifier::Unspecified, object_ty.clone());
        store.add_class(ClassDef {
            name: "java.util.ArrayList".to_string(),
            kind: ClassKind::Class,
            type_params: vec![array_list_e],
            super_class: Some(object_ty.clone()),
            interfaces: vec![AnnotatedType::parameterized(
                Qualifier::Unspecified,
                list,
                vec![AnnotatedType::type_var(Qualifier::Unspecified, array_list_e)],
            )],
        });

        let map_k = store.add_type_param("K", Qualifier::Unspecified, object_ty.clone());
        let map_v = store.add_type_param("V", Qualifier::Unspecified, object_ty);
        store.add_class(ClassDef {
            name: "java.util.Map".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![map_k, map_v],
            super_class: None,
            interfaces: vec![],
        });

        store
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.classes.push(def);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)
    }

    pub fn add_type_param(
        &mut self,
        name: &str,
        qualifier: Qualifier,
        bound: AnnotatedType,
    ) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDecl {
            name: name.to_string(),
            qualifier,
            bound,
        });
        id
    }

    pub fn type_param_mut(&mut self, id: TypeVarId) -> Option<&mut TypeParamDecl> {
        self.type_params.get_mut(id.0 as usize)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDecl> {
        self.type_params.get(id.0 as usize)
    }

    fn object_class(&self) -> ClassId {
        ClassId(0)
    }
}
