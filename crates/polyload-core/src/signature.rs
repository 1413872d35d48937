//! Parameter and return type metadata for functions.
//!
//! Signatures are descriptive: they record what a function declares so
//! callers can validate arguments before invoking it. Nothing here is
//! enforced automatically on invocation.

use std::fmt;

use crate::TypeId;
use crate::Value;
use crate::error::{InvokeError, RegistrationError};

/// A declared type: numeric tag plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    /// The type tag.
    pub id: TypeId,
    /// Display name, as the declaring side spelled it.
    pub name: String,
}

impl Type {
    /// Create a type entry.
    pub fn new(id: TypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// A type entry named after its tag.
    pub fn of(id: TypeId) -> Self {
        Self::new(id, id.name())
    }
}

/// One parameter slot of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: Type,
}

/// Ordered parameter list plus return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<Parameter>,
    ret: Type,
}

impl Signature {
    /// Create a signature with `arity` parameters, all `null`-typed and
    /// unnamed, returning `null`.
    pub fn with_arity(arity: usize) -> Self {
        Self {
            params: vec![
                Parameter {
                    name: String::new(),
                    ty: Type::of(TypeId::Null),
                };
                arity
            ],
            ret: Type::of(TypeId::Null),
        }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The parameters in declaration order.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// The parameter at `index`.
    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// The return type.
    pub fn return_type(&self) -> &Type {
        &self.ret
    }

    /// Set the parameter at `index`.
    ///
    /// The arity is fixed at construction; an out-of-range index is an error.
    pub fn set(
        &mut self,
        index: usize,
        name: impl Into<String>,
        ty: Type,
    ) -> Result<(), RegistrationError> {
        let arity = self.arity();
        let slot = self
            .params
            .get_mut(index)
            .ok_or(RegistrationError::ParameterOutOfRange { index, arity })?;
        slot.name = name.into();
        slot.ty = ty;
        Ok(())
    }

    /// Set the return type.
    pub fn set_return(&mut self, ty: Type) {
        self.ret = ty;
    }

    /// Check `args` against the declared parameters.
    ///
    /// Count must match exactly; each argument's type tag must equal the
    /// declared tag, except that `null`-typed parameters accept anything.
    pub fn check_args(&self, function: &str, args: &[Value]) -> Result<(), InvokeError> {
        if args.len() != self.arity() {
            return Err(InvokeError::ArgumentCount {
                name: function.to_string(),
                expected: self.arity(),
                actual: args.len(),
            });
        }

        for (index, (param, arg)) in self.params.iter().zip(args).enumerate() {
            let expected = param.ty.id;
            if expected != TypeId::Null && expected != arg.type_id() {
                return Err(InvokeError::ArgumentType {
                    name: function.to_string(),
                    index,
                    expected,
                    actual: arg.type_id(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty.id)?;
        }
        write!(f, ") -> {}", self.ret.id)
    }
}
