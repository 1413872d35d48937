//! Entities stored in a scope.

use crate::{Function, Value};

/// A loaded entity: what a name in a [`Scope`](crate::Scope) refers to.
#[derive(Debug)]
#[non_exhaustive]
pub enum Object {
    /// A callable.
    Function(Function),
    /// A plain value (a global, a constant).
    Value(Value),
}

impl Object {
    /// The function, if this object is one.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Object::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The value, if this object is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Object::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this object is a function.
    pub fn is_function(&self) -> bool {
        matches!(self, Object::Function(_))
    }
}

impl From<Function> for Object {
    fn from(f: Function) -> Self {
        Object::Function(f)
    }
}

impl From<Value> for Object {
    fn from(v: Value) -> Self {
        Object::Value(v)
    }
}
