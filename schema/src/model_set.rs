use crate::{
    error::ModelError,
    model::Model,
    types::{registered_primitives, Type, TypeDef, TypeRef},
};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Every model loaded during one run, plus the canonical type registry.
///
/// The registry maps a name to exactly one [`Type`] instance, so two
/// references to `list<i32>` anywhere in the set are the same `Arc`.
#[derive(Debug)]
pub struct ModelSet {
    models:  Vec<Arc<Model>>,
    by_name: HashMap<String, usize>,
    pending: HashSet<String>,
    types:   HashMap<String, TypeRef>,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSet {
    pub fn new() -> Self {
        let types = registered_primitives()
            .into_iter()
            .map(|ty| (ty.name().to_string(), ty))
            .collect();
        ModelSet {
            models: Vec::new(),
            by_name: HashMap::new(),
            pending: HashSet::new(),
            types,
        }
    }

    /// Starts a new model. The name stays reserved until the model is handed
    /// back through [`ModelSet::finish_model`].
    pub fn create_model(&mut self, name: &str) -> Result<Model, ModelError> {
        if self.by_name.contains_key(name) {
            return Err(ModelError::DuplicateModel(name.to_string()));
        }
        if !self.pending.insert(name.to_string()) {
            return Err(ModelError::CircularInclude(name.to_string()));
        }
        Ok(Model::new(Some(name)))
    }

    /// A model whose declarations are not qualified by any model name. It is
    /// never registered, so other models cannot refer to it.
    pub fn create_anonymous_model(&self) -> Model {
        Model::new(None)
    }

    pub fn finish_model(&mut self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        if let Some(name) = model.name() {
            self.pending.remove(name);
            self.by_name.insert(name.to_string(), self.models.len());
            self.models.push(model.clone());
        }
        model
    }

    /// Releases the name reserved for a model whose construction failed,
    /// along with any named types it had already registered and every
    /// cached container built over them.
    pub fn abandon_model(&mut self, name: &str) {
        self.pending.remove(name);
        self.types.retain(|_, ty| !owned_by(ty, name));
    }

    pub fn model(&self, name: &str) -> Option<&Arc<Model>> {
        self.by_name.get(name).map(|&i| &self.models[i])
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains(name)
    }

    /// Loaded models, in the order they finished.
    pub fn models(&self) -> &[Arc<Model>] {
        &self.models
    }

    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).cloned()
    }

    /// Binds `name` to `ty`. Re-registering the same instance is a no-op.
    pub fn register_type(&mut self, name: &str, ty: TypeRef) -> Result<TypeRef, ModelError> {
        match self.types.get(name) {
            Some(existing) if Arc::ptr_eq(existing, &ty) => Ok(ty),
            Some(_) => Err(ModelError::TypeAlreadyRegistered(name.to_string())),
            None => {
                self.types.insert(name.to_string(), ty.clone());
                Ok(ty)
            }
        }
    }

    /// Returns the instance already registered under `ty`'s name, or
    /// registers `ty` and returns it.
    pub fn register_type_if_new(&mut self, ty: Type) -> TypeRef {
        self.types
            .entry(ty.name().to_string())
            .or_insert_with(|| Arc::new(ty))
            .clone()
    }

    pub fn list_type(&mut self, elem: &TypeRef) -> TypeRef {
        let name = Type::list_name(elem);
        self.canonical(name, || TypeDef::List(elem.clone()))
    }

    pub fn set_type(&mut self, elem: &TypeRef) -> TypeRef {
        let name = Type::set_name(elem);
        self.canonical(name, || TypeDef::Set(elem.clone()))
    }

    pub fn map_type(&mut self, key: &TypeRef, value: &TypeRef) -> TypeRef {
        let name = Type::map_name(key, value);
        self.canonical(name, || TypeDef::Map {
            key:   key.clone(),
            value: value.clone(),
        })
    }

    fn canonical(&mut self, name: String, def: impl FnOnce() -> TypeDef) -> TypeRef {
        if let Some(ty) = self.types.get(&name) {
            return ty.clone();
        }
        self.register_type_if_new(Type::container(name, def()))
    }
}

/// True when `ty` is a named type of model `name` or a container over one.
fn owned_by(ty: &Type, name: &str) -> bool {
    ty.model_name() == Some(name) || ty.element_types().into_iter().any(|elem| owned_by(elem, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{I32, I64, STRING};

    #[test]
    fn test_primitives_registered() {
        let set = ModelSet::new();
        assert!(Arc::ptr_eq(&set.get_type("i32").unwrap(), &*I32));
        assert!(set.get_type("void").is_none());
    }

    #[test]
    fn test_container_identity() {
        let mut set = ModelSet::new();
        let a = set.list_type(&*I32);
        let b = set.list_type(&I32.clone());
        let c = set.list_type(&*I64);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.name(), "list<i32>");

        let nested = set.map_type(&*STRING, &a);
        assert_eq!(nested.name(), "map<string,list<i32>>");
        assert!(Arc::ptr_eq(&nested, &set.map_type(&*STRING, &b)));
        assert!(!Arc::ptr_eq(&set.set_type(&*I32), &a));
    }

    #[test]
    fn test_register_type_conflict() {
        let mut set = ModelSet::new();
        let list = set.list_type(&*I32);
        assert!(set.register_type("list<i32>", list.clone()).is_ok());
        let other = set.list_type(&*I64);
        let err = set.register_type("list<i32>", other).unwrap_err();
        assert_eq!(err, ModelError::TypeAlreadyRegistered("list<i32>".into()));
    }

    #[test]
    fn test_model_lifecycle() {
        let mut set = ModelSet::new();
        let m = set.create_model("tutorial").unwrap();
        assert!(set.is_pending("tutorial"));
        assert!(matches!(set.create_model("tutorial"), Err(ModelError::CircularInclude(_))));
        set.finish_model(m);
        assert!(set.is_loaded("tutorial"));
        assert!(matches!(set.create_model("tutorial"), Err(ModelError::DuplicateModel(_))));
        assert_eq!(set.models().len(), 1);
    }

    #[test]
    fn test_abandoned_model_releases_types() {
        use crate::{field::{Annotations, FieldSet}, struct_type::StructType};

        let mut set = ModelSet::new();
        let mut m = set.create_model("m").unwrap();
        m.add_struct(&mut set, "S", StructType::new(FieldSet::new("m.S"), false, Annotations::new(), None))
            .unwrap();
        let s = set.get_type("m.S").unwrap();
        let list = set.list_type(&s);
        let map = set.map_type(&*STRING, &list);
        let ints = set.list_type(&*I32);
        set.abandon_model("m");
        assert!(set.get_type("m.S").is_none());
        assert!(set.get_type(list.name()).is_none());
        assert!(set.get_type(map.name()).is_none());
        assert!(Arc::ptr_eq(&set.get_type("list<i32>").unwrap(), &ints));

        let mut m = set.create_model("m").unwrap();
        let s2 = m
            .add_struct(&mut set, "S", StructType::new(FieldSet::new("m.S"), false, Annotations::new(), None))
            .unwrap();
        let list2 = set.list_type(&s2);
        assert!(!Arc::ptr_eq(&list2, &list));
        assert!(Arc::ptr_eq(list2.element_types()[0], &s2));
    }
}
