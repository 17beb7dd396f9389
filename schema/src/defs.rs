use crate::{
    error::ModelError,
    types::TypeRef,
    value::{Literal, Value},
};

use std::fmt;
use std::sync::Arc;

/// A named, typed constant. The value is validated once, when the
/// constant is built.
#[derive(Debug, Clone)]
pub struct ConstDef {
    model: Option<String>,
    name:  String,
    ty:    TypeRef,
    value: Value,
    docs:  Option<Vec<String>>,
}

impl ConstDef {
    pub fn new(
        model: Option<&str>,
        name: &str,
        ty: TypeRef,
        literal: &Literal,
        docs: Option<Vec<String>>,
    ) -> Result<Self, ModelError> {
        let value = ty.validate(literal)?;
        Ok(ConstDef {
            model: model.map(str::to_string),
            name: name.to_string(),
            ty,
            value,
            docs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qname(&self) -> String {
        match &self.model {
            Some(model) => format!("{}.{}", model, self.name),
            None => self.name.clone(),
        }
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn doc_comments(&self) -> Option<&[String]> {
        self.docs.as_deref()
    }
}

impl PartialEq for ConstDef {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model
            && self.name == other.name
            && Arc::ptr_eq(&self.ty, &other.ty)
            && self.value == other.value
    }
}

impl fmt::Display for ConstDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const {} {} = {}", self.ty.qname(), self.qname(), self.value)
    }
}

/// `namespace <generator> <namespace>`. A generator of `*` applies to any
/// generator that has no namespace of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDef {
    generator: String,
    namespace: String,
}

impl NamespaceDef {
    pub const WILDCARD: &'static str = "*";

    pub fn new(generator: &str, namespace: &str) -> Self {
        NamespaceDef {
            generator: generator.to_string(),
            namespace: namespace.to_string(),
        }
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_wildcard(&self) -> bool {
        self.generator == Self::WILDCARD
    }
}
