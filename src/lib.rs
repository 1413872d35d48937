//! Polyload: one registry, many language runtimes.
//!
//! Polyload dispatches load requests to per-language adapters and resolves
//! names across everything they have loaded. The embedding host is itself an
//! implementation: callbacks registered with [`Registry::register`] are
//! visible to every lookup, so loaded code can call back into the host.
//!
//! The data model lives in [`polyload_core`]; the registry, adapter contract
//! and host proxy in [`polyload_registry`]. This crate re-exports both.
//!
//! # Example
//!
//! ```
//! use polyload::prelude::*;
//!
//! let registry = Registry::new(LoaderConfig::default().without_script_path());
//! registry.initialize();
//!
//! registry
//!     .register(
//!         "greet",
//!         |args: &[Value]| {
//!             let name: String = String::from_value(&args[0])?;
//!             Ok(format!("hello {name}").into_value())
//!         },
//!         TypeId::String,
//!         &[TypeId::String],
//!     )
//!     .unwrap();
//!
//! let greet = registry.get("greet").unwrap();
//! let reply = greet
//!     .as_function()
//!     .unwrap()
//!     .invoke(&[Value::String("world".into())]);
//! assert_eq!(reply, Ok(Value::String("hello world".into())));
//!
//! registry.destroy();
//! ```
//!
//! # Features
//!
//! - `profiling`: instrument loads and lookups with the `profiling` crate

pub use polyload_core::*;
pub use polyload_registry::{
    Adapter, AdapterFactory, Capabilities, HOST_PROXY_TAG, HostInvoke, HostProxy, Implementation,
    ImplementationHandle, ImplementationId, ImplementationKind, LoaderConfig, MAX_TAG_LENGTH,
    NativeCallback, Registry, RegistryBuilder, RegistryState, Tag,
};

pub use polyload_registry::config;

pub mod prelude {
    pub use polyload_core::{
        Context, FromValue, Function, FunctionInterface, IntoValue, InvokeError, Object,
        PolyloadError, Scope, Signature, TypeId, Value,
    };
    pub use polyload_registry::{
        Adapter, AdapterFactory, Capabilities, LoaderConfig, Registry, RegistryState, Tag,
    };
}
