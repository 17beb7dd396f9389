use crate::{defs::ConstDef, enum_type::EnumElem};

use std::fmt;
use std::sync::Arc;

/// A literal exactly as it appeared in IDL source, before it has been
/// checked against a declared type.
///
/// Identifiers in literal position are resolved by the parser into either
/// [`Literal::Const`] (a reference to an already validated constant) or
/// [`Literal::Enum`] (an enum element). Everything else is raw text turned
/// into a typed scalar or collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Char(char),
    Str(String),
    Binary(Vec<u8>),
    List(Vec<Literal>),
    Map(Vec<(Literal, Literal)>),
    Enum(EnumElem),
    Const(Arc<ConstDef>),
}

/// A literal that has been validated (and coerced) against a type.
///
/// Values are what constants and field defaults carry in the model. They
/// never refer back to another constant: resolution happens once, when the
/// literal is validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Char(char),
    Str(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Enum(EnumElem),
}

impl Value {
    /// Returns the boolean held by a [Bool](#variant.Bool), `false` otherwise.
    pub fn as_bool(&self) -> bool {
        matches!(*self, Value::Bool(true))
    }

    /// Returns the integer held by an [Int](#variant.Int) or the numeric value
    /// of an [Enum](#variant.Enum) element.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Char(c) => Some(*c as i64),
            Value::Enum(elem) => Some(elem.value() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(b),
            Value::Int(i) => Literal::Int(i),
            Value::Double(d) => Literal::Double(d),
            Value::Char(c) => Literal::Char(c),
            Value::Str(s) => Literal::Str(s),
            Value::Binary(b) => Literal::Binary(b),
            Value::List(items) | Value::Set(items) => {
                Literal::List(items.into_iter().map(Literal::from).collect())
            }
            Value::Map(entries) => Literal::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Literal::from(k), Literal::from(v)))
                    .collect(),
            ),
            Value::Enum(elem) => Literal::Enum(elem),
        }
    }
}

fn write_seq<T: fmt::Display>(f: &mut fmt::Formatter<'_>, open: char, items: &[T], close: char) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Double(d) => write!(f, "{:?}", d),
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Literal::List(items) => write_seq(f, '[', items, ']'),
            Literal::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Literal::Enum(elem) => write!(f, "{}", elem),
            Literal::Const(def) => write!(f, "{}", def.qname()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::List(items) => write_seq(f, '[', items, ']'),
            Value::Set(items) => write_seq(f, '{', items, '}'),
            other => write!(f, "{}", Literal::from(other.clone())),
        }
    }
}
