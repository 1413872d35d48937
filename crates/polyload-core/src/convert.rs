//! Conversion traits between Rust types and [`Value`].
//!
//! - [`FromValue`]: extract a Rust value from a [`Value`]
//! - [`IntoValue`]: convert a Rust value into a [`Value`]
//!
//! Integer extraction accepts any integer variant and checks bounds, so a
//! callback declared over `i32` still works when the caller passes a `Long`
//! that fits.
//!
//! ## Example
//!
//! ```
//! use polyload_core::{FromValue, IntoValue, Value};
//!
//! let v = Value::Long(42);
//! let n = i32::from_value(&v).unwrap();
//! assert_eq!(n.into_value(), Value::Int(42));
//! ```

use crate::Value;
use crate::error::ConversionError;

/// Extract a value from a [`Value`].
pub trait FromValue: Sized {
    /// Extract a value of this type.
    ///
    /// Returns a `ConversionError` if the value holds an incompatible type.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Value`].
pub trait IntoValue {
    /// Convert this value into a [`Value`].
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    let v = value.as_i64().ok_or(ConversionError::TypeMismatch {
                        expected: "int",
                        actual: value.type_name(),
                    })?;
                    <$ty>::try_from(v).map_err(|_| ConversionError::IntegerOverflow {
                        value: v,
                        target_type: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_into_value_int {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self.into())
                }
            }
        )*
    };
}

impl_into_value_int!(i8 => Char, i16 => Short, i32 => Int, i64 => Long, u8 => Short, u16 => Int, u32 => Long);

// ============================================================================
// Float implementations
// ============================================================================

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_f64().ok_or(ConversionError::TypeMismatch {
            expected: "double",
            actual: value.type_name(),
        })
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v),
            _ => f64::from_value(value).map(|v| v as f32),
        }
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

// ============================================================================
// Other primitives
// ============================================================================

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(*v),
            _ => Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or(ConversionError::TypeMismatch {
                expected: "string",
                actual: value.type_name(),
            })
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Buffer(b) => Ok(b.clone()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "buffer",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Buffer(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_widening_and_narrowing() {
        assert_eq!(i64::from_value(&Value::Char(-3)), Ok(-3));
        assert_eq!(i16::from_value(&Value::Long(1000)), Ok(1000));
        assert_eq!(
            i8::from_value(&Value::Int(300)),
            Err(ConversionError::IntegerOverflow {
                value: 300,
                target_type: "i8",
            })
        );
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert!(matches!(
            u32::from_value(&Value::Int(-1)),
            Err(ConversionError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn type_mismatch_names_actual_type() {
        assert_eq!(
            i32::from_value(&Value::String("5".into())),
            Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: "string",
            })
        );
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(f64::from_value(&Value::Int(4)), Ok(4.0));
        assert_eq!(f32::from_value(&Value::Float(0.5)), Ok(0.5));
    }

    #[test]
    fn into_value_picks_matching_variant() {
        assert_eq!(5i32.into_value(), Value::Int(5));
        assert_eq!(5u32.into_value(), Value::Long(5));
        assert_eq!("hi".into_value(), Value::String("hi".into()));
        assert_eq!(().into_value(), Value::Null);
        assert_eq!(None::<i32>.into_value(), Value::Null);
    }
}
