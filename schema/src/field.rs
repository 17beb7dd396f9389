use crate::{
    error::ModelError,
    types::TypeRef,
    value::{Literal, Value},
};

use std::collections::{BTreeMap, HashMap, HashSet};

/// Free-form `key = value` annotations attached to a declaration.
pub type Annotations = BTreeMap<String, String>;

/// A single field of a struct, union, exception, argument list or throws
/// clause.
#[derive(Debug, Clone)]
pub struct FieldDef {
    id:          i16,
    name:        String,
    ty:          TypeRef,
    required:    bool,
    default:     Option<Value>,
    annotations: Annotations,
    docs:        Option<Vec<String>>,
}

impl FieldDef {
    /// Builds a field, validating `default` against `ty` when one is given.
    pub fn new(
        id: i16,
        name: &str,
        ty: TypeRef,
        required: bool,
        default: Option<&Literal>,
        annotations: Annotations,
        docs: Option<Vec<String>>,
    ) -> Result<Self, ModelError> {
        let default = match default {
            Some(literal) => Some(ty.validate(literal)?),
            None => None,
        };
        Ok(FieldDef {
            id,
            name: name.to_string(),
            ty,
            required,
            default,
            annotations,
            docs,
        })
    }

    /// A required field without default, annotations or documentation.
    pub fn simple(id: i16, name: &str, ty: TypeRef) -> Self {
        FieldDef {
            id,
            name: name.to_string(),
            ty,
            required: true,
            default: None,
            annotations: Annotations::new(),
            docs: None,
        }
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn doc_comments(&self) -> Option<&[String]> {
        self.docs.as_deref()
    }
}

/// Ordered fields of one scope, with no id or name used twice.
#[derive(Debug, Clone)]
pub struct FieldSet {
    owner:  String,
    fields: Vec<FieldDef>,
    names:  HashMap<String, usize>,
    ids:    HashSet<i16>,
}

impl FieldSet {
    pub fn new(owner: impl Into<String>) -> Self {
        FieldSet {
            owner:  owner.into(),
            fields: Vec::new(),
            names:  HashMap::new(),
            ids:    HashSet::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn add_field(&mut self, field: FieldDef) -> Result<(), ModelError> {
        if self.ids.contains(&field.id) {
            return Err(ModelError::DuplicateFieldId {
                id:    field.id,
                owner: self.owner.clone(),
            });
        }
        if self.names.contains_key(&field.name) {
            return Err(ModelError::DuplicateFieldName {
                name:  field.name.clone(),
                owner: self.owner.clone(),
            });
        }
        self.ids.insert(field.id);
        self.names.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.names.get(name).map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{I32, STRING};

    #[test]
    fn test_duplicate_id_rejected() {
        let mut set = FieldSet::new("m.Point");
        set.add_field(FieldDef::simple(1, "x", I32.clone())).unwrap();
        let err = set.add_field(FieldDef::simple(1, "y", I32.clone())).unwrap_err();
        assert_eq!(err, ModelError::DuplicateFieldId { id: 1, owner: "m.Point".into() });
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut set = FieldSet::new("m.Point");
        set.add_field(FieldDef::simple(1, "x", I32.clone())).unwrap();
        let err = set.add_field(FieldDef::simple(2, "x", STRING.clone())).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateFieldName { .. }));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut set = FieldSet::new("svc.call.<args>");
        set.add_field(FieldDef::simple(3, "c", I32.clone())).unwrap();
        set.add_field(FieldDef::simple(1, "a", I32.clone())).unwrap();
        set.add_field(FieldDef::simple(2, "b", I32.clone())).unwrap();
        let names: Vec<&str> = set.fields().iter().map(FieldDef::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(set.field("a").unwrap().id(), 1);
    }

    #[test]
    fn test_default_validated_at_construction() {
        let ok = FieldDef::new(1, "n", I32.clone(), false, Some(&Literal::Int(7)), Annotations::new(), None).unwrap();
        assert_eq!(ok.default_value(), Some(&Value::Int(7)));
        assert!(!ok.is_required());
        let bad = FieldDef::new(1, "n", I32.clone(), false, Some(&Literal::Str("x".into())), Annotations::new(), None);
        assert!(matches!(bad, Err(ModelError::IllegalValue { .. })));
    }
}
