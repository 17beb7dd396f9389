use crate::{
    enum_type::EnumType,
    error::ModelError,
    struct_type::StructType,
    value::{Literal, Value},
};
use lazy_static::lazy_static;

use std::fmt;
use std::sync::Arc;

/// Shared handle to a type. Identity (`Arc::ptr_eq`) is type identity.
pub type TypeRef = Arc<Type>;

const DOUBLE_EXACT_MAX: i64 = 1 << 53;
const DOUBLE_EXACT_MIN: i64 = -DOUBLE_EXACT_MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Boolean,
    Integer,
    FloatingPoint,
    String,
    Binary,
    Void,
    Enum,
    Struct,
    Exception,
    Container,
    Service,
    Function,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Boolean       => "BOOLEAN",
            Category::Integer       => "INTEGER",
            Category::FloatingPoint => "FLOATING_POINT",
            Category::String        => "STRING",
            Category::Binary        => "BINARY",
            Category::Void          => "VOID",
            Category::Enum          => "ENUM",
            Category::Struct        => "STRUCT",
            Category::Exception     => "EXCEPTION",
            Category::Container     => "CONTAINER",
            Category::Service       => "SERVICE",
            Category::Function      => "FUNCTION",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    Void,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Bool   => "bool",
            Primitive::Byte   => "byte",
            Primitive::I16    => "i16",
            Primitive::I32    => "i32",
            Primitive::I64    => "i64",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Binary => "binary",
            Primitive::Void   => "void",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Primitive::Bool => Category::Boolean,
            Primitive::Byte | Primitive::I16 | Primitive::I32 | Primitive::I64 => Category::Integer,
            Primitive::Double => Category::FloatingPoint,
            Primitive::String => Category::String,
            Primitive::Binary => Category::Binary,
            Primitive::Void => Category::Void,
        }
    }

    /// Inclusive signed range for the integer widths.
    fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            Primitive::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            Primitive::I16  => Some((i16::MIN as i64, i16::MAX as i64)),
            Primitive::I32  => Some((i32::MIN as i64, i32::MAX as i64)),
            Primitive::I64  => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

/// What a type is made of, beyond its name and category.
#[derive(Debug)]
pub enum TypeDef {
    Primitive(Primitive),
    List(TypeRef),
    Set(TypeRef),
    Map { key: TypeRef, value: TypeRef },
    Enum(EnumType),
    Struct(StructType),
}

#[derive(Debug)]
pub struct Type {
    name:     String,
    model:    Option<String>,
    category: Category,
    base:     Option<TypeRef>,
    def:      TypeDef,
}

lazy_static! {
    pub static ref BOOL:   TypeRef = Type::primitive(Primitive::Bool);
    pub static ref BYTE:   TypeRef = Type::primitive(Primitive::Byte);
    pub static ref I16:    TypeRef = Type::primitive(Primitive::I16);
    pub static ref I32:    TypeRef = Type::primitive(Primitive::I32);
    pub static ref I64:    TypeRef = Type::primitive(Primitive::I64);
    pub static ref DOUBLE: TypeRef = Type::primitive(Primitive::Double);
    pub static ref STRING: TypeRef = Type::primitive(Primitive::String);
    pub static ref BINARY: TypeRef = Type::primitive(Primitive::Binary);
    pub static ref VOID:   TypeRef = Type::primitive(Primitive::Void);
}

/// Primitives that may be named in field and constant declarations. `void`
/// is deliberately absent: it is only meaningful as a function return type.
pub fn registered_primitives() -> [TypeRef; 8] {
    [
        BOOL.clone(),
        BYTE.clone(),
        I16.clone(),
        I32.clone(),
        I64.clone(),
        DOUBLE.clone(),
        STRING.clone(),
        BINARY.clone(),
    ]
}

impl Type {
    fn primitive(p: Primitive) -> TypeRef {
        Arc::new(Type {
            name:     p.name().to_string(),
            model:    None,
            category: p.category(),
            base:     None,
            def:      TypeDef::Primitive(p),
        })
    }

    pub fn list_name(elem: &Type) -> String {
        format!("list<{}>", elem.qname())
    }

    pub fn set_name(elem: &Type) -> String {
        format!("set<{}>", elem.qname())
    }

    pub fn map_name(key: &Type, value: &Type) -> String {
        format!("map<{},{}>", key.qname(), value.qname())
    }

    /// An unregistered container type. Use the `ModelSet` constructors to
    /// obtain the canonical instance.
    pub(crate) fn container(name: String, def: TypeDef) -> Type {
        Type {
            name,
            model: None,
            category: Category::Container,
            base: None,
            def,
        }
    }

    /// A named enum owned by `model`. Enums widen to `i32`.
    pub fn new_enum(model: Option<&str>, name: &str, def: EnumType) -> TypeRef {
        Arc::new(Type {
            name:     name.to_string(),
            model:    model.map(str::to_string),
            category: Category::Enum,
            base:     Some(I32.clone()),
            def:      TypeDef::Enum(def),
        })
    }

    /// A named struct or union owned by `model`.
    pub fn new_struct(model: Option<&str>, name: &str, def: StructType) -> TypeRef {
        Self::named_struct(model, name, def, Category::Struct)
    }

    pub fn new_exception(model: Option<&str>, name: &str, def: StructType) -> TypeRef {
        Self::named_struct(model, name, def, Category::Exception)
    }

    fn named_struct(model: Option<&str>, name: &str, def: StructType, category: Category) -> TypeRef {
        Arc::new(Type {
            name: name.to_string(),
            model: model.map(str::to_string),
            category,
            base: None,
            def: TypeDef::Struct(def),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name prefixed with the owning model's name, when there is one.
    pub fn qname(&self) -> String {
        match &self.model {
            Some(model) => format!("{}.{}", model, self.name),
            None => self.name.clone(),
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn def(&self) -> &TypeDef {
        &self.def
    }

    /// The primitive this type widens to; `None` means the type is its own base.
    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn primitive_kind(&self) -> Option<Primitive> {
        match self.def {
            TypeDef::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.def {
            TypeDef::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match &self.def {
            TypeDef::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Element types of a container: one for list/set, key then value for map.
    pub fn element_types(&self) -> Vec<&TypeRef> {
        match &self.def {
            TypeDef::List(elem) | TypeDef::Set(elem) => vec![elem],
            TypeDef::Map { key, value } => vec![key, value],
            _ => Vec::new(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.category, Category::Integer | Category::FloatingPoint)
    }

    pub fn is_primitive(&self) -> bool {
        self.is_numeric() || self.category == Category::Boolean
    }

    pub fn is_enum(&self) -> bool {
        self.category == Category::Enum
    }

    pub fn is_struct(&self) -> bool {
        self.category == Category::Struct
    }

    pub fn is_exception(&self) -> bool {
        self.category == Category::Exception
    }

    pub fn is_container(&self) -> bool {
        self.category == Category::Container
    }

    pub fn is_void(&self) -> bool {
        self.category == Category::Void
    }

    pub fn is_list(&self) -> bool {
        matches!(self.def, TypeDef::List(_))
    }

    pub fn is_set(&self) -> bool {
        matches!(self.def, TypeDef::Set(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.def, TypeDef::Map { .. })
    }

    pub fn is_union(&self) -> bool {
        self.as_struct().map(StructType::is_union).unwrap_or(false)
    }

    /// Checks `literal` against this type and returns the coerced value.
    ///
    /// A constant reference whose declared type is this very type passes
    /// through untouched; a constant of any other type has its payload
    /// validated afresh against this one.
    pub fn validate(&self, literal: &Literal) -> Result<Value, ModelError> {
        if let Literal::Const(def) = literal {
            if std::ptr::eq(Arc::as_ptr(def.ty()), self) {
                return Ok(def.value().clone());
            }
            return self.validate(&Literal::from(def.value().clone()));
        }
        if let Literal::Null = literal {
            if self.is_primitive() || self.is_enum() {
                return Err(ModelError::NullNotPermitted(self.name.clone()));
            }
            return Ok(Value::Null);
        }
        match &self.def {
            TypeDef::Primitive(p) => self.validate_primitive(*p, literal),
            TypeDef::List(elem) => match literal {
                Literal::List(items) => Ok(Value::List(validate_all(elem, items)?)),
                _ => Err(self.illegal(literal)),
            },
            TypeDef::Set(elem) => match literal {
                Literal::List(items) => {
                    let mut set: Vec<Value> = Vec::with_capacity(items.len());
                    for value in validate_all(elem, items)? {
                        if !set.contains(&value) {
                            set.push(value);
                        }
                    }
                    Ok(Value::Set(set))
                }
                _ => Err(self.illegal(literal)),
            },
            TypeDef::Map { key, value } => match literal {
                Literal::Map(entries) => {
                    let mut map: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
                    for (k, v) in entries {
                        let k = key.validate(k)?;
                        let v = value.validate(v)?;
                        match map.iter_mut().find(|(existing, _)| *existing == k) {
                            Some(slot) => slot.1 = v,
                            None => map.push((k, v)),
                        }
                    }
                    Ok(Value::Map(map))
                }
                _ => Err(self.illegal(literal)),
            },
            TypeDef::Enum(def) => match literal {
                Literal::Enum(elem) if def.owns(elem) => {
                    Ok(Value::Enum(elem.clone()))
                }
                _ => Err(self.illegal(literal)),
            },
            // no literal form exists for struct-shaped values
            TypeDef::Struct(_) => Err(self.illegal(literal)),
        }
    }

    fn validate_primitive(&self, p: Primitive, literal: &Literal) -> Result<Value, ModelError> {
        match (p.category(), literal) {
            (Category::Boolean, Literal::Bool(b)) => Ok(Value::Bool(*b)),
            (Category::Boolean, Literal::Int(i)) => Ok(Value::Bool(*i != 0)),
            (Category::Boolean, Literal::Double(d)) => Ok(Value::Bool(d.trunc() != 0.0)),

            (Category::Integer, Literal::Int(i)) => match p.int_range() {
                Some((min, max)) if *i >= min && *i <= max => Ok(Value::Int(*i)),
                _ => Err(ModelError::OutOfRange {
                    ty:    self.name.clone(),
                    value: i.to_string(),
                }),
            },
            (Category::Integer, Literal::Char(c)) => {
                if p == Primitive::Byte && (*c as u32) > i8::MAX as u32 {
                    return Err(ModelError::OutOfRange {
                        ty:    self.name.clone(),
                        value: format!("{:?}", c),
                    });
                }
                Ok(Value::Char(*c))
            }

            (Category::FloatingPoint, Literal::Double(d)) => Ok(Value::Double(*d)),
            (Category::FloatingPoint, Literal::Int(i)) => {
                if *i <= DOUBLE_EXACT_MAX && *i >= DOUBLE_EXACT_MIN {
                    Ok(Value::Double(*i as f64))
                } else {
                    Err(ModelError::PrecisionLoss(*i))
                }
            }

            (Category::String, Literal::Str(s)) => Ok(Value::Str(s.clone())),

            (Category::Binary, Literal::Binary(bytes)) => Ok(Value::Binary(bytes.clone())),
            (Category::Binary, Literal::List(items)) => {
                let mut bytes = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Literal::Int(i) if *i >= i8::MIN as i64 && *i <= i8::MAX as i64 => {
                            bytes.push(*i as i8 as u8)
                        }
                        Literal::Char(c) if (*c as u32) <= i8::MAX as u32 => bytes.push(*c as u8),
                        _ => return Err(self.illegal(literal)),
                    }
                }
                Ok(Value::Binary(bytes))
            }

            _ => Err(self.illegal(literal)),
        }
    }

    fn illegal(&self, literal: &Literal) -> ModelError {
        ModelError::IllegalValue {
            ty:    self.name.clone(),
            value: literal.to_string(),
        }
    }
}

fn validate_all(elem: &TypeRef, items: &[Literal]) -> Result<Vec<Value>, ModelError> {
    items.iter().map(|item| elem.validate(item)).collect()
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
