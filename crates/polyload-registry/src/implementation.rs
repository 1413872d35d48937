//! Live implementations and the handles the registry hands out.
//!
//! An [`Implementation`] wraps one adapter together with its tag and a
//! process-unique [`ImplementationId`]. It enforces the parts of the adapter
//! contract the adapter itself cannot: capability checks before delegation
//! and a single `destroy`, run either by the registry during unload or by
//! `Drop`, whichever comes first.
//!
//! An [`ImplementationHandle`] separates two kinds of access. The load lock
//! serializes everything that needs the adapter mutably: loads, execution
//! paths and destroy. Lookups go through the handle's clone of the adapter's
//! [`Context`] and only take the scope lock, so they never wait for a load.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use polyload_core::{AdapterError, Context, LoadError, Object, PolyloadError};
use tracing::debug;

use crate::adapter::{Adapter, Capabilities};
use crate::host::HostProxy;
use crate::tag::Tag;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImplementationId(u64);

impl ImplementationId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two implementation variants this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplementationKind {
    /// The embedding host, under [`HOST_PROXY_TAG`](crate::HOST_PROXY_TAG).
    HostProxy,
    /// A per-language adapter produced by a factory.
    Language,
}

/// One live adapter plus its identity.
pub struct Implementation {
    id: ImplementationId,
    tag: Tag,
    kind: ImplementationKind,
    context: Context,
    adapter: Box<dyn Adapter>,
    destroyed: bool,
}

impl Implementation {
    /// Wrap a factory-built language adapter.
    pub fn language(tag: Tag, adapter: Box<dyn Adapter>) -> Self {
        Self::with_adapter(tag, ImplementationKind::Language, adapter)
    }

    /// Create the host proxy implementation.
    pub fn host() -> Self {
        Self::with_adapter(
            Tag::host(),
            ImplementationKind::HostProxy,
            Box::new(HostProxy::new()),
        )
    }

    fn with_adapter(tag: Tag, kind: ImplementationKind, adapter: Box<dyn Adapter>) -> Self {
        Self {
            id: ImplementationId::next(),
            tag,
            kind,
            context: adapter.context().clone(),
            adapter,
            destroyed: false,
        }
    }

    /// The implementation's identity.
    pub fn id(&self) -> ImplementationId {
        self.id
    }

    /// The tag it was created for.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Host proxy or language adapter.
    pub fn kind(&self) -> ImplementationKind {
        self.kind
    }

    /// Check if `destroy` has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The adapter's capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.adapter.capabilities()
    }

    /// The adapter's context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Look up `name` in this implementation's scope.
    pub fn get(&self, name: &str) -> Option<Arc<Object>> {
        self.context.get(name)
    }

    /// Add an execution path.
    ///
    /// Adapters without [`Capabilities::EXECUTION_PATH`] ignore the call.
    pub fn execution_path(&mut self, path: &Path) -> Result<(), AdapterError> {
        self.check_live()?;
        if !self.capabilities().contains(Capabilities::EXECUTION_PATH) {
            debug!(tag = %self.tag, path = %path.display(), "Adapter ignores execution paths");
            return Ok(());
        }
        self.adapter.execution_path(path)
    }

    /// Load already-joined source paths.
    pub fn load_from_file(&mut self, paths: &[PathBuf]) -> Result<(), PolyloadError> {
        self.check_load(Capabilities::LOAD_FILE, "load_from_file")?;
        self.adapter.load_from_file(paths)?;
        Ok(())
    }

    /// Load source from memory.
    pub fn load_from_memory(&mut self, buffer: &[u8]) -> Result<(), PolyloadError> {
        self.check_load(Capabilities::LOAD_MEMORY, "load_from_memory")?;
        if buffer.is_empty() {
            return Err(LoadError::EmptyBuffer.into());
        }
        self.adapter.load_from_memory(buffer)?;
        Ok(())
    }

    /// Load a package.
    pub fn load_from_package(&mut self, path: &Path) -> Result<(), PolyloadError> {
        self.check_load(Capabilities::LOAD_PACKAGE, "load_from_package")?;
        self.adapter.load_from_package(path)?;
        Ok(())
    }

    /// Destroy the adapter, releasing every object in its scope.
    ///
    /// Idempotent: only the first call reaches the adapter.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.adapter.destroy();
        debug!(tag = %self.tag, id = %self.id, "Destroyed loader implementation");
    }

    /// Fail with [`AdapterError::Destroyed`] once `destroy` has run.
    pub fn check_live(&self) -> Result<(), AdapterError> {
        if self.destroyed {
            return Err(AdapterError::Destroyed {
                tag: self.tag.to_string(),
            });
        }
        Ok(())
    }

    fn check_load(
        &self,
        capability: Capabilities,
        operation: &'static str,
    ) -> Result<(), PolyloadError> {
        self.check_live()?;
        if !self.capabilities().contains(capability) {
            return Err(LoadError::Unsupported {
                tag: self.tag.to_string(),
                operation,
            }
            .into());
        }
        Ok(())
    }
}

impl Drop for Implementation {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

/// Shared handle to a live implementation.
///
/// Cloning the handle does not clone the implementation; two handles refer
/// to the same implementation exactly when their ids are equal.
#[derive(Clone)]
pub struct ImplementationHandle {
    id: ImplementationId,
    tag: Tag,
    kind: ImplementationKind,
    context: Context,
    inner: Arc<Mutex<Implementation>>,
}

impl ImplementationHandle {
    /// Wrap an implementation for sharing.
    pub fn new(implementation: Implementation) -> Self {
        Self {
            id: implementation.id(),
            tag: implementation.tag().clone(),
            kind: implementation.kind(),
            context: implementation.context().clone(),
            inner: Arc::new(Mutex::new(implementation)),
        }
    }

    /// The implementation's identity.
    pub fn id(&self) -> ImplementationId {
        self.id
    }

    /// The implementation's tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Host proxy or language adapter.
    pub fn kind(&self) -> ImplementationKind {
        self.kind
    }

    /// The implementation's context, usable without the load lock.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Look up `name` without waiting for an in-flight load.
    pub fn get(&self, name: &str) -> Option<Arc<Object>> {
        self.context.get(name)
    }

    /// Take the load lock for exclusive access to the adapter.
    ///
    /// Held for the whole of a load. The registry never holds its own lock
    /// while waiting for this one.
    pub fn lock(&self) -> MutexGuard<'_, Implementation> {
        self.inner.lock()
    }

    /// Check if both handles refer to the same implementation.
    pub fn same(&self, other: &ImplementationHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ImplementationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationHandle")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .finish()
    }
}
