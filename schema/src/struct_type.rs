use crate::field::{Annotations, FieldDef, FieldSet};

/// Body of a struct, union or exception. Unions share this representation;
/// the one-field-set rule for unions is left to generators.
#[derive(Debug, Clone)]
pub struct StructType {
    fields:      FieldSet,
    is_union:    bool,
    annotations: Annotations,
    docs:        Option<Vec<String>>,
}

impl StructType {
    pub fn new(fields: FieldSet, is_union: bool, annotations: Annotations, docs: Option<Vec<String>>) -> Self {
        StructType { fields, is_union, annotations, docs }
    }

    pub fn is_union(&self) -> bool {
        self.is_union
    }

    pub fn field_set(&self) -> &FieldSet {
        &self.fields
    }

    pub fn fields(&self) -> &[FieldDef] {
        self.fields.fields()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.field(name)
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn doc_comments(&self) -> Option<&[String]> {
        self.docs.as_deref()
    }
}
