//! Generic values passed across the function call boundary.

use std::fmt;

use crate::TypeId;

/// A value handed to, or returned from, a [`Function`](crate::Function).
///
/// Loaded code and the host exchange arguments and results through this
/// enum. Each variant corresponds to exactly one [`TypeId`].
#[derive(Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value; also the result of a void function.
    #[default]
    Null,
    Bool(bool),
    Char(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Buffer(Vec<u8>),
    Array(Vec<Value>),
    /// Key/value pairs in insertion order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// The type tag of this value.
    pub fn type_id(&self) -> TypeId {
        match self {
            Value::Null => TypeId::Null,
            Value::Bool(_) => TypeId::Bool,
            Value::Char(_) => TypeId::Char,
            Value::Short(_) => TypeId::Short,
            Value::Int(_) => TypeId::Int,
            Value::Long(_) => TypeId::Long,
            Value::Float(_) => TypeId::Float,
            Value::Double(_) => TypeId::Double,
            Value::String(_) => TypeId::String,
            Value::Buffer(_) => TypeId::Buffer,
            Value::Array(_) => TypeId::Array,
            Value::Map(_) => TypeId::Map,
        }
    }

    /// Human-readable name of this value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_id().name()
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widen any integer variant to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Char(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any numeric variant to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Char(v) => write!(f, "Char({})", v),
            Value::Short(v) => write!(f, "Short({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Long(v) => write!(f, "Long({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Double(v) => write!(f, "Double({})", v),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
        }
    }
}
