//! Core data model for the polyload runtime.
//!
//! This crate holds everything that lives *inside* an implementation:
//!
//! - [`Value`] and [`TypeId`] - the generic values crossing the call boundary
//! - [`Signature`] and [`Function`] - typed callable descriptors with an
//!   owned payload and an `{invoke, destroy}` interface
//! - [`Object`] - the polymorphic entity stored in a scope
//! - [`Scope`] and [`Context`] - the per-implementation symbol table
//! - [`error`] - the error taxonomy shared by every crate in the workspace
//!
//! The registry that ties implementations together lives in
//! `polyload-registry`.

pub mod context;
pub mod convert;
pub mod error;
pub mod function;
pub mod object;
pub mod scope;
pub mod signature;
pub mod type_id;
pub mod value;

pub use context::Context;
pub use convert::{FromValue, IntoValue};
pub use error::{
    AdapterError, ConfigError, ConversionError, InvokeError, LoadError, PolyloadError,
    RegistrationError,
};
pub use function::{Function, FunctionInterface, MAX_ARITY};
pub use object::Object;
pub use scope::Scope;
pub use signature::{Parameter, Signature, Type};
pub use type_id::TypeId;
pub use value::Value;
