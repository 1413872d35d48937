//! Implementation registry for the polyload runtime.
//!
//! This crate provides [`Registry`], which maps [`Tag`]s to live
//! [`Implementation`]s, creates them lazily through [`AdapterFactory`]s,
//! routes load requests to them and resolves names across all of them. The
//! reserved [`HOST_PROXY_TAG`] implementation exposes host callbacks to
//! loaded code through [`Registry::register`].
//!
//! # Example
//!
//! ```
//! use polyload_core::{TypeId, Value};
//! use polyload_registry::{LoaderConfig, Registry};
//!
//! let registry = Registry::new(LoaderConfig::default());
//! registry.initialize();
//!
//! registry
//!     .register("add", |args: &[Value]| {
//!         let a = args[0].as_i64().unwrap_or(0);
//!         let b = args[1].as_i64().unwrap_or(0);
//!         Ok(Value::Long(a + b))
//!     }, TypeId::Long, &[TypeId::Long, TypeId::Long])
//!     .unwrap();
//!
//! let add = registry.get("add").unwrap();
//! let result = add.as_function().unwrap().invoke(&[Value::Long(2), Value::Long(3)]);
//! assert_eq!(result, Ok(Value::Long(5)));
//! ```

pub mod adapter;
pub mod config;
pub mod host;
pub mod implementation;
pub mod registry;
pub mod tag;

pub use adapter::{Adapter, AdapterFactory, Capabilities};
pub use config::LoaderConfig;
pub use host::{HostInvoke, HostProxy, NativeCallback};
pub use implementation::{
    Implementation, ImplementationHandle, ImplementationId, ImplementationKind,
};
pub use registry::{Registry, RegistryBuilder, RegistryState};
pub use tag::{HOST_PROXY_TAG, MAX_TAG_LENGTH, Tag};
