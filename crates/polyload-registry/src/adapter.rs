//! The contract every per-language adapter satisfies.
//!
//! Adapters are external collaborators: the registry never looks inside one
//! beyond this trait. An adapter owns a [`Context`] and populates its scope
//! when asked to load code.
//!
//! # Loading and Lookup
//!
//! The registry keeps its own clone of the adapter's context, taken when
//! the implementation is created, and resolves names through it. Loads into
//! one adapter are serialized, but lookups never wait on them: an adapter
//! may call [`Registry::get`](crate::Registry::get) from inside a load, for
//! example to resolve an import, and sees everything defined so far,
//! including its own earlier definitions. An adapter must keep the context
//! it was created with.
//!
//! # Teardown
//!
//! [`Adapter::destroy`] must release every object defined in the adapter's
//! scope. The default implementation clears the scope, which drops each
//! [`Function`](polyload_core::Function) and runs its payload's `destroy`
//! exactly once. Adapters that hold interpreter state override `destroy`
//! and call the default behaviour (`self.context().clear()`) before shutting
//! the interpreter down.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use polyload_core::{AdapterError, Context, LoadError};

use crate::Tag;

bitflags! {
    /// Operations an adapter supports.
    ///
    /// The registry checks these before delegating and reports a missing
    /// capability as [`LoadError::Unsupported`] without calling the adapter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Accepts additional execution (search) paths.
        const EXECUTION_PATH = 1 << 0;
        /// Loads source files.
        const LOAD_FILE = 1 << 1;
        /// Loads source from an in-memory buffer.
        const LOAD_MEMORY = 1 << 2;
        /// Loads precompiled packages.
        const LOAD_PACKAGE = 1 << 3;
    }
}

/// A per-language backend.
pub trait Adapter: Send + Sync {
    /// Operations this adapter supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    /// Add a directory the adapter resolves imports against.
    fn execution_path(&mut self, path: &Path) -> Result<(), AdapterError>;

    /// Load source files. Paths are already joined onto the script path.
    fn load_from_file(&mut self, paths: &[PathBuf]) -> Result<(), LoadError>;

    /// Load source from an in-memory buffer.
    fn load_from_memory(&mut self, buffer: &[u8]) -> Result<(), LoadError>;

    /// Load a precompiled package.
    fn load_from_package(&mut self, path: &Path) -> Result<(), LoadError>;

    /// The adapter's context.
    fn context(&self) -> &Context;

    /// Release everything the adapter holds.
    ///
    /// Called exactly once by the owning
    /// [`Implementation`](crate::Implementation).
    fn destroy(&mut self) {
        self.context().clear();
    }
}

/// Constructs adapters for a tag.
pub trait AdapterFactory: Send + Sync {
    /// Create an adapter for `tag`, loading its own support libraries from
    /// `library_path` if it has any.
    fn create(&self, tag: &Tag, library_path: &Path) -> Result<Box<dyn Adapter>, AdapterError>;
}

impl<F> AdapterFactory for F
where
    F: Fn(&Tag, &Path) -> Result<Box<dyn Adapter>, AdapterError> + Send + Sync,
{
    fn create(&self, tag: &Tag, library_path: &Path) -> Result<Box<dyn Adapter>, AdapterError> {
        (self)(tag, library_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyload_core::Value;

    struct Inert {
        context: Context,
    }

    impl Adapter for Inert {
        fn capabilities(&self) -> Capabilities {
            Capabilities::LOAD_MEMORY
        }

        fn execution_path(&mut self, _path: &Path) -> Result<(), AdapterError> {
            Ok(())
        }

        fn load_from_file(&mut self, _paths: &[PathBuf]) -> Result<(), LoadError> {
            Ok(())
        }

        fn load_from_memory(&mut self, buffer: &[u8]) -> Result<(), LoadError> {
            let name = String::from_utf8_lossy(buffer).into_owned();
            self.context.define(name, Value::Null);
            Ok(())
        }

        fn load_from_package(&mut self, _path: &Path) -> Result<(), LoadError> {
            Ok(())
        }

        fn context(&self) -> &Context {
            &self.context
        }
    }

    #[test]
    fn closure_factory() {
        let factory = |tag: &Tag, _: &Path| -> Result<Box<dyn Adapter>, AdapterError> {
            Ok(Box::new(Inert {
                context: Context::new(tag.as_str()),
            }))
        };
        let tag = Tag::new("inert").unwrap();
        let adapter = factory.create(&tag, Path::new(".")).unwrap();
        assert_eq!(adapter.context().name(), "inert");
        assert_eq!(adapter.capabilities(), Capabilities::LOAD_MEMORY);
    }

    #[test]
    fn default_destroy_clears_scope() {
        let mut adapter = Inert {
            context: Context::new("inert"),
        };
        adapter.load_from_memory(b"a").unwrap();
        assert_eq!(adapter.context().scope().len(), 1);
        adapter.destroy();
        assert!(adapter.context().scope().is_empty());
    }
}
