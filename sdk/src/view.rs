//! Serializable snapshots of a model, as handed to templates.

use brine_thrift_schema::{
    Category, ConstDef, FieldDef, FunctionDef, Model, ServiceDef, Type, TypeRef, Value,
};
use serde::Serialize;
use serde_json::{json, Value as Json};

use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct TypeView {
    pub name:       String,
    pub qname:      String,
    pub model:      Option<String>,
    pub category:   &'static str,
    /// Name of the primitive this type widens to, or its own name.
    pub base:       String,
    pub is_list:    bool,
    pub is_set:     bool,
    pub is_map:     bool,
    pub is_union:   bool,
    /// Element types of a container; key then value for maps.
    pub elements:   Vec<TypeView>,
}

impl From<&Type> for TypeView {
    fn from(ty: &Type) -> Self {
        TypeView {
            name:     ty.name().to_string(),
            qname:    ty.qname(),
            model:    ty.model_name().map(str::to_string),
            category: ty.category().as_str(),
            base:     ty.base().map_or_else(|| ty.name().to_string(), |b| b.name().to_string()),
            is_list:  ty.is_list(),
            is_set:   ty.is_set(),
            is_map:   ty.is_map(),
            is_union: ty.is_union(),
            elements: ty.element_types().into_iter().map(|t| TypeView::from(&**t)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub id:          i16,
    pub name:        String,
    #[serde(rename = "type")]
    pub ty:          TypeView,
    pub required:    bool,
    pub default:     Option<Json>,
    pub annotations: BTreeMap<String, String>,
    pub docs:        Vec<String>,
}

impl From<&FieldDef> for FieldView {
    fn from(field: &FieldDef) -> Self {
        FieldView {
            id:          field.id(),
            name:        field.name().to_string(),
            ty:          TypeView::from(&**field.ty()),
            required:    field.is_required(),
            default:     field.default_value().map(value_to_json),
            annotations: field.annotations().clone(),
            docs:        docs(field.doc_comments()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstView {
    pub name:  String,
    pub qname: String,
    #[serde(rename = "type")]
    pub ty:    TypeView,
    pub value: Json,
    pub docs:  Vec<String>,
}

impl From<&ConstDef> for ConstView {
    fn from(def: &ConstDef) -> Self {
        ConstView {
            name:  def.name().to_string(),
            qname: def.qname(),
            ty:    TypeView::from(&**def.ty()),
            value: value_to_json(def.value()),
            docs:  docs(def.doc_comments()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumElemView {
    pub name:  String,
    pub value: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumView {
    pub name:     String,
    pub qname:    String,
    pub elements: Vec<EnumElemView>,
    pub docs:     Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructView {
    pub name:         String,
    pub qname:        String,
    pub is_union:     bool,
    pub is_exception: bool,
    pub fields:       Vec<FieldView>,
    pub annotations:  BTreeMap<String, String>,
    pub docs:         Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionView {
    pub name:        String,
    pub return_type: TypeView,
    pub oneway:      bool,
    pub args:        Vec<FieldView>,
    pub throws:      Vec<FieldView>,
    pub docs:        Vec<String>,
}

impl From<&FunctionDef> for FunctionView {
    fn from(f: &FunctionDef) -> Self {
        FunctionView {
            name:        f.name().to_string(),
            return_type: TypeView::from(&**f.return_type()),
            oneway:      f.is_oneway(),
            args:        f.args().fields().iter().map(FieldView::from).collect(),
            throws:      f.throws().fields().iter().map(FieldView::from).collect(),
            docs:        docs(f.doc_comments()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceView {
    pub name:              String,
    pub qname:             String,
    pub extends:           Option<String>,
    /// Inherited functions first, then this service's own.
    pub functions:         Vec<FunctionView>,
    pub defined_functions: Vec<FunctionView>,
    pub docs:              Vec<String>,
}

impl From<&ServiceDef> for ServiceView {
    fn from(svc: &ServiceDef) -> Self {
        ServiceView {
            name:              svc.name().to_string(),
            qname:             svc.qname(),
            extends:           svc.super_service().map(|s| s.qname()),
            functions:         svc.get_functions().into_iter().map(FunctionView::from).collect(),
            defined_functions: svc.get_defined_functions().iter().map(FunctionView::from).collect(),
            docs:              docs(svc.doc_comments()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceView {
    pub generator: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelView {
    pub name:       Option<String>,
    pub includes:   Vec<String>,
    pub namespaces: Vec<NamespaceView>,
    pub consts:     Vec<ConstView>,
    pub enums:      Vec<EnumView>,
    pub structs:    Vec<StructView>,
    pub unions:     Vec<StructView>,
    pub exceptions: Vec<StructView>,
    pub services:   Vec<ServiceView>,
}

impl From<&Model> for ModelView {
    fn from(model: &Model) -> Self {
        let (unions, structs): (Vec<StructView>, Vec<StructView>) =
            model.structs().iter().filter_map(struct_view).partition(|s| s.is_union);
        ModelView {
            name:       model.name().map(str::to_string),
            includes:   model.includes().to_vec(),
            namespaces: model
                .namespaces()
                .iter()
                .map(|ns| NamespaceView {
                    generator: ns.generator().to_string(),
                    namespace: ns.namespace().to_string(),
                })
                .collect(),
            consts:     model.consts().iter().map(|c| ConstView::from(&**c)).collect(),
            enums:      model.enums().iter().filter_map(enum_view).collect(),
            structs,
            unions,
            exceptions: model.exceptions().iter().filter_map(struct_view).collect(),
            services:   model.services().iter().map(|s| ServiceView::from(&**s)).collect(),
        }
    }
}

pub fn enum_view(ty: &TypeRef) -> Option<EnumView> {
    let def = ty.as_enum()?;
    Some(EnumView {
        name:     ty.name().to_string(),
        qname:    ty.qname(),
        elements: def
            .elements()
            .iter()
            .map(|e| EnumElemView { name: e.name().to_string(), value: e.value() })
            .collect(),
        docs:     docs(def.doc_comments()),
    })
}

pub fn struct_view(ty: &TypeRef) -> Option<StructView> {
    let def = ty.as_struct()?;
    Some(StructView {
        name:         ty.name().to_string(),
        qname:        ty.qname(),
        is_union:     def.is_union(),
        is_exception: ty.category() == Category::Exception,
        fields:       def.fields().iter().map(FieldView::from).collect(),
        annotations:  def.annotations().clone(),
        docs:         docs(def.doc_comments()),
    })
}

fn docs(lines: Option<&[String]>) -> Vec<String> {
    lines.map(<[String]>::to_vec).unwrap_or_default()
}

/// Maps become lists of `{key, value}` pairs since keys need not be
/// strings; enum values keep both their symbol and number.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => json!(i),
        Value::Double(d) => serde_json::Number::from_f64(*d).map_or(Json::Null, Json::Number),
        Value::Char(c) => Json::String(c.to_string()),
        Value::Str(s) => Json::String(s.clone()),
        Value::Binary(bytes) => json!(bytes),
        Value::List(items) | Value::Set(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => Json::Array(
            entries
                .iter()
                .map(|(k, v)| json!({ "key": value_to_json(k), "value": value_to_json(v) }))
                .collect(),
        ),
        Value::Enum(elem) => json!({
            "enum": elem.enum_qname(),
            "name": elem.name(),
            "value": elem.value(),
        }),
    }
}
