pub mod error;
pub mod formatter;

use crate::heap::{Heap, ObjectRef};
use crate::object::ObjectKind;
use compact_str::{CompactString, CompactStringExt};
use error::RuntimeErrorKind;

/// A runtime value. Primitives are stored inline, everything else lives on the heap.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Number(f64),
    String(CompactString),
    Object(ObjectRef),
}

/// The type of a value, as named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Bool,
    Number,
    String,
    Object(ObjectKind),
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::None => write!(f, "none"),
            ValueKind::Bool => write!(f, "boolean"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Object(kind) => write!(f, "{kind}"),
        }
    }
}

impl Value {
    pub fn kind(&self, heap: &Heap) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Object(handle) => heap
                .get_kind(*handle)
                .map_or(ValueKind::None, ValueKind::Object),
        }
    }

    pub fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Value::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

// Unary operators
impl Value {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::None)
    }

    pub fn logical_not(&self) -> Value {
        Value::Bool(!self.is_truthy())
    }

    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Number(v) => Ok(Value::Number(-v)),
            _ => Err(RuntimeErrorKind::NonNumeric),
        }
    }
}

// Binary operators
impl Value {
    // Arithmetic + string concatenation
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Ok(Value::Number(lhs + rhs)),
            (Value::String(lhs), Value::String(rhs)) => {
                Ok(Value::String([lhs, rhs].concat_compact()))
            }
            _ => Err(RuntimeErrorKind::NonAddable),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        Ok(Value::Number(lhs - rhs))
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        Ok(Value::Number(lhs * rhs))
    }

    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        if rhs == 0.0 {
            return Err(RuntimeErrorKind::DivisionByZero);
        }
        Ok(Value::Number(lhs / rhs))
    }

    // Comparison
    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        Ok(Value::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        Ok(Value::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        Ok(Value::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = Self::numbers(self, other)?;
        Ok(Value::Bool(lhs >= rhs))
    }

    // Equality: identity for objects, by value for primitives, never across variants.
    pub fn is_equal(&self, other: &Value) -> bool {
        self == other
    }

    pub fn is_not_equal(&self, other: &Value) -> bool {
        !self.is_equal(other)
    }

    fn numbers(lhs: &Value, rhs: &Value) -> Result<(f64, f64), RuntimeErrorKind> {
        match (lhs, rhs) {
            (Value::Number(lhs), Value::Number(rhs)) => Ok((*lhs, *rhs)),
            _ => Err(RuntimeErrorKind::NonNumerics),
        }
    }
}
