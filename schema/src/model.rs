use crate::{
    defs::{ConstDef, NamespaceDef},
    enum_type::{EnumElem, EnumType},
    error::ModelError,
    model_set::ModelSet,
    service::ServiceDef,
    struct_type::StructType,
    types::{Type, TypeRef},
};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name-keyed table that remembers declaration order.
#[derive(Debug, Clone)]
struct Table<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table { items: Vec::new(), index: HashMap::new() }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, key: String, item: T) {
        self.index.insert(key, self.items.len());
        self.items.push(item);
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    fn values(&self) -> &[T] {
        &self.items
    }
}

/// Anything a name inside a model can resolve to.
#[derive(Debug, Clone)]
pub enum Symbol {
    Const(Arc<ConstDef>),
    EnumElem(EnumElem),
    Enum(TypeRef),
    Struct(TypeRef),
    Exception(TypeRef),
    Service(Arc<ServiceDef>),
}

impl Symbol {
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Const(_) => "const",
            Symbol::EnumElem(_) => "enum element",
            Symbol::Enum(_) => "enum",
            Symbol::Struct(ty) if ty.is_union() => "union",
            Symbol::Struct(_) => "struct",
            Symbol::Exception(_) => "exception",
            Symbol::Service(_) => "service",
        }
    }

    /// The named type behind an enum, struct, union or exception symbol.
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Symbol::Enum(ty) | Symbol::Struct(ty) | Symbol::Exception(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qname = match self {
            Symbol::Const(def) => def.qname(),
            Symbol::EnumElem(elem) => elem.qname(),
            Symbol::Enum(ty) | Symbol::Struct(ty) | Symbol::Exception(ty) => ty.qname(),
            Symbol::Service(svc) => svc.qname(),
        };
        write!(f, "{} {}", self.kind(), qname)
    }
}

/// Symbol table for one IDL compilation unit.
///
/// All declarations share one flat namespace: a const and a struct may not
/// have the same name. Enum elements are additionally reachable as
/// `Enum.ELEM`.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name:       Option<String>,
    includes:   Vec<String>,
    namespaces: Vec<NamespaceDef>,
    consts:     Table<Arc<ConstDef>>,
    enum_elems: Table<EnumElem>,
    enums:      Table<TypeRef>,
    structs:    Table<TypeRef>,
    exceptions: Table<TypeRef>,
    services:   Table<Arc<ServiceDef>>,
}

impl Model {
    /// Models are normally obtained through [`ModelSet::create_model`]; a
    /// model with no name qualifies nothing.
    pub(crate) fn new(name: Option<&str>) -> Self {
        Model {
            name: name.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `name` as seen from other models.
    pub fn qname(&self, name: &str) -> String {
        match &self.name {
            Some(model) => format!("{}.{}", model, name),
            None => name.to_string(),
        }
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn namespaces(&self) -> &[NamespaceDef] {
        &self.namespaces
    }

    /// Namespace declared for `generator`, falling back to the `*` one.
    pub fn namespace(&self, generator: &str) -> Option<&str> {
        let find = |g: &str| {
            self.namespaces
                .iter()
                .find(|ns| ns.generator() == g)
                .map(NamespaceDef::namespace)
        };
        find(generator).or_else(|| find(NamespaceDef::WILDCARD))
    }

    pub fn consts(&self) -> &[Arc<ConstDef>] {
        self.consts.values()
    }

    pub fn enums(&self) -> &[TypeRef] {
        self.enums.values()
    }

    /// Structs and unions, in declaration order.
    pub fn structs(&self) -> &[TypeRef] {
        self.structs.values()
    }

    pub fn exceptions(&self) -> &[TypeRef] {
        self.exceptions.values()
    }

    pub fn services(&self) -> &[Arc<ServiceDef>] {
        self.services.values()
    }

    /// Resolves `name` locally, then as `model.rest` in another loaded model.
    pub fn lookup(&self, set: &ModelSet, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.lookup_local(name) {
            return Some(symbol);
        }
        let (prefix, rest) = name.split_once('.')?;
        if self.name.as_deref() == Some(prefix) {
            return self.lookup(set, rest);
        }
        set.model(prefix).and_then(|model| model.lookup(set, rest))
    }

    fn lookup_local(&self, name: &str) -> Option<Symbol> {
        if let Some(def) = self.consts.get(name) {
            return Some(Symbol::Const(def.clone()));
        }
        if let Some(elem) = self.enum_elems.get(name) {
            return Some(Symbol::EnumElem(elem.clone()));
        }
        if let Some(ty) = self.enums.get(name) {
            return Some(Symbol::Enum(ty.clone()));
        }
        if let Some(ty) = self.structs.get(name) {
            return Some(Symbol::Struct(ty.clone()));
        }
        if let Some(ty) = self.exceptions.get(name) {
            return Some(Symbol::Exception(ty.clone()));
        }
        self.services.get(name).map(|svc| Symbol::Service(svc.clone()))
    }

    /// Resolves a type name: this model's qualified name first, then the
    /// name as written (primitives, containers, `model.Type`).
    pub fn lookup_type(&self, set: &ModelSet, name: &str) -> Option<TypeRef> {
        set.get_type(&self.qname(name)).or_else(|| set.get_type(name))
    }

    pub fn get_service(&self, set: &ModelSet, name: &str) -> Result<Arc<ServiceDef>, ModelError> {
        match self.lookup(set, name) {
            Some(Symbol::Service(svc)) => Ok(svc),
            Some(other) => Err(ModelError::NotAService {
                name:  name.to_string(),
                found: other.to_string(),
            }),
            None => Err(ModelError::UnknownService(name.to_string())),
        }
    }

    fn check_name(&self, set: &ModelSet, name: &str) -> Result<(), ModelError> {
        match self.lookup(set, name) {
            Some(existing) => Err(ModelError::NameAlreadyDefined {
                name: name.to_string(),
                by:   existing.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn add_include(&mut self, model: &str) {
        if !self.includes.iter().any(|m| m == model) {
            self.includes.push(model.to_string());
        }
    }

    pub fn add_namespace(&mut self, def: NamespaceDef) -> Result<(), ModelError> {
        if self.namespaces.iter().any(|ns| ns.generator() == def.generator()) {
            return Err(ModelError::DuplicateNamespace(def.generator().to_string()));
        }
        self.namespaces.push(def);
        Ok(())
    }

    pub fn add_const(&mut self, set: &ModelSet, def: ConstDef) -> Result<Arc<ConstDef>, ModelError> {
        self.check_name(set, def.name())?;
        let def = Arc::new(def);
        self.consts.insert(def.name().to_string(), def.clone());
        Ok(def)
    }

    pub fn add_enum(&mut self, set: &mut ModelSet, name: &str, def: EnumType) -> Result<TypeRef, ModelError> {
        self.check_name(set, name)?;
        let ty = Type::new_enum(self.name(), name, def);
        set.register_type(&ty.qname(), ty.clone())?;
        if let Some(def) = ty.as_enum() {
            for elem in def.elements() {
                self.enum_elems.insert(format!("{}.{}", name, elem.name()), elem.clone());
            }
        }
        self.enums.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    /// Adds a struct or, when `def.is_union()`, a union.
    pub fn add_struct(&mut self, set: &mut ModelSet, name: &str, def: StructType) -> Result<TypeRef, ModelError> {
        self.check_name(set, name)?;
        let ty = Type::new_struct(self.name(), name, def);
        set.register_type(&ty.qname(), ty.clone())?;
        self.structs.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    pub fn add_exception(&mut self, set: &mut ModelSet, name: &str, def: StructType) -> Result<TypeRef, ModelError> {
        self.check_name(set, name)?;
        let ty = Type::new_exception(self.name(), name, def);
        set.register_type(&ty.qname(), ty.clone())?;
        self.exceptions.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    pub fn add_service(&mut self, set: &ModelSet, def: ServiceDef) -> Result<Arc<ServiceDef>, ModelError> {
        self.check_name(set, def.name())?;
        let def = Arc::new(def);
        self.services.insert(def.name().to_string(), def.clone());
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        enum_type::EnumBuilder,
        field::{Annotations, FieldSet},
        types::I32,
        value::Literal,
    };

    fn empty_struct(owner: &str) -> StructType {
        StructType::new(FieldSet::new(owner), false, Annotations::new(), None)
    }

    #[test]
    fn test_names_share_one_namespace() {
        let mut set = ModelSet::new();
        let mut m = set.create_model("m").unwrap();
        let c = ConstDef::new(Some("m"), "Thing", I32.clone(), &Literal::Int(1), None).unwrap();
        m.add_const(&set, c).unwrap();
        let err = m.add_struct(&mut set, "Thing", empty_struct("m.Thing")).unwrap_err();
        assert_eq!(
            err,
            ModelError::NameAlreadyDefined { name: "Thing".into(), by: "const m.Thing".into() }
        );
    }

    #[test]
    fn test_enum_elements_indexed() {
        let mut set = ModelSet::new();
        let mut m = set.create_model("m").unwrap();
        let mut b = EnumBuilder::new("m.Color", None);
        b.add_elem("RED").unwrap();
        m.add_enum(&mut set, "Color", b.build()).unwrap();
        match m.lookup(&set, "Color.RED") {
            Some(Symbol::EnumElem(elem)) => assert_eq!(elem.value(), 0),
            other => panic!("unexpected {:?}", other),
        }
        assert!(m.lookup_type(&set, "Color").unwrap().is_enum());
        assert!(set.get_type("m.Color").is_some());
    }

    #[test]
    fn test_cross_model_lookup() {
        let mut set = ModelSet::new();
        let mut a = set.create_model("A").unwrap();
        let foo = a.add_struct(&mut set, "Foo", empty_struct("A.Foo")).unwrap();
        let a = set.finish_model(a);
        let b = set.create_model("B").unwrap();

        let via_b = b.lookup(&set, "A.Foo").and_then(|s| s.as_type().cloned()).unwrap();
        let via_a = a.lookup(&set, "Foo").and_then(|s| s.as_type().cloned()).unwrap();
        assert!(Arc::ptr_eq(&via_a, &via_b));
        assert!(Arc::ptr_eq(&foo, &b.lookup_type(&set, "A.Foo").unwrap()));
        assert!(b.lookup(&set, "C.Foo").is_none());
    }

    #[test]
    fn test_get_service_errors() {
        let mut set = ModelSet::new();
        let mut m = set.create_model("m").unwrap();
        m.add_struct(&mut set, "S", empty_struct("m.S")).unwrap();
        m.add_service(&set, ServiceDef::new(Some("m"), "Svc", None, None)).unwrap();
        assert_eq!(m.get_service(&set, "Svc").unwrap().qname(), "m.Svc");
        assert!(matches!(m.get_service(&set, "S"), Err(ModelError::NotAService { .. })));
        assert!(matches!(m.get_service(&set, "Nope"), Err(ModelError::UnknownService(_))));
    }

    #[test]
    fn test_namespace_fallback() {
        let mut m = Model::new(None);
        m.add_namespace(NamespaceDef::new("*", "com.example")).unwrap();
        m.add_namespace(NamespaceDef::new("rs", "example")).unwrap();
        assert_eq!(m.namespace("rs"), Some("example"));
        assert_eq!(m.namespace("java"), Some("com.example"));
        assert!(m.add_namespace(NamespaceDef::new("rs", "other")).is_err());
        assert_eq!(m.qname("Foo"), "Foo");
    }
}
