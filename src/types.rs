//! Types module: defines document field types and literal values.
//!
//! This module provides FieldType and LiteralValue enums, covering every value a
//! predicate can compare a document field against.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Static type of a document field or expression.
///
/// `Text` is deliberately not an `Array(Char)`: a text receiver and an
/// array-of-char receiver never share a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FieldType {
    Text,
    Char,
    Int,
    Float,
    Bool,
    Array(Box<FieldType>),
    Unknown, // type inference failures and untyped members
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LiteralValue {
    Null,
    Text(String),
    Char(char),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<LiteralValue>),
}

impl FieldType {
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Char | FieldType::Int | FieldType::Float | FieldType::Bool
        )
    }

    /// True for any `Array(_)`, whatever the element type.
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }

    pub fn array_of(elem: FieldType) -> Self {
        FieldType::Array(Box::new(elem))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Char => write!(f, "char"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Array(elem) => write!(f, "array<{}>", elem),
            FieldType::Unknown => write!(f, "unknown"),
        }
    }
}

impl LiteralValue {
    /// Infers the type of this literal value.
    /// Null and empty arrays carry no element information and infer as Unknown.
    pub fn get_type(&self) -> FieldType {
        match self {
            LiteralValue::Null => FieldType::Unknown,
            LiteralValue::Text(_) => FieldType::Text,
            LiteralValue::Char(_) => FieldType::Char,
            LiteralValue::Int(_) => FieldType::Int,
            LiteralValue::Float(_) => FieldType::Float,
            LiteralValue::Bool(_) => FieldType::Bool,
            LiteralValue::Array(vals) => match vals.first() {
                Some(first) => {
                    let first_ty = first.get_type();
                    if vals.iter().all(|v| v.get_type() == first_ty) {
                        FieldType::array_of(first_ty)
                    } else {
                        FieldType::array_of(FieldType::Unknown)
                    }
                }
                None => FieldType::array_of(FieldType::Unknown),
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            LiteralValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON shape of the value, as it would appear inside a stored document.
    /// `None` when the value (or any element) is a non-finite float, which JSON
    /// cannot represent.
    pub fn to_json(&self) -> Option<Value> {
        Some(match self {
            LiteralValue::Null => Value::Null,
            LiteralValue::Text(s) => Value::String(s.clone()),
            LiteralValue::Char(c) => Value::String(c.to_string()),
            LiteralValue::Int(i) => Value::from(*i),
            LiteralValue::Float(x) => Value::Number(serde_json::Number::from_f64(*x)?),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Array(vals) => {
                Value::Array(vals.iter().map(LiteralValue::to_json).collect::<Option<_>>()?)
            }
        })
    }
}

impl From<&str> for LiteralValue {
    fn from(v: &str) -> Self {
        LiteralValue::Text(v.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(v: String) -> Self {
        LiteralValue::Text(v)
    }
}

impl From<i64> for LiteralValue {
    fn from(v: i64) -> Self {
        LiteralValue::Int(v)
    }
}

impl From<bool> for LiteralValue {
    fn from(v: bool) -> Self {
        LiteralValue::Bool(v)
    }
}
