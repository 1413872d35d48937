//! Numeric type tags used in function signatures.
//!
//! The numbering is part of the registration interface: hosts that declare
//! signatures through `register_raw` pass these numbers directly.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Type identifier for signature entries and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum TypeId {
    Bool = 0,
    Char = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    String = 7,
    Buffer = 8,
    Array = 9,
    Map = 10,
    Ptr = 11,
    Function = 12,
    Null = 13,
}

impl TypeId {
    /// Lowercase name of the type.
    pub fn name(self) -> &'static str {
        match self {
            TypeId::Bool => "bool",
            TypeId::Char => "char",
            TypeId::Short => "short",
            TypeId::Int => "int",
            TypeId::Long => "long",
            TypeId::Float => "float",
            TypeId::Double => "double",
            TypeId::String => "string",
            TypeId::Buffer => "buffer",
            TypeId::Array => "array",
            TypeId::Map => "map",
            TypeId::Ptr => "ptr",
            TypeId::Function => "function",
            TypeId::Null => "null",
        }
    }

    /// Check if this is one of the integer types.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeId::Char | TypeId::Short | TypeId::Int | TypeId::Long
        )
    }

    /// Check if this is one of the floating point types.
    pub fn is_float(self) -> bool {
        matches!(self, TypeId::Float | TypeId::Double)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
