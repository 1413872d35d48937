//! Per-implementation reflective state.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Object, Scope};

/// Shared handle to an implementation's scope.
///
/// Cloning a context does not copy the scope: every clone reads and writes
/// the same symbol table. The adapter holds one clone and defines into it
/// while loading; the registry holds another and looks names up without
/// waiting for the load to finish.
///
/// The scope lock is only held for the duration of a single call. Guards
/// returned by [`scope`](Self::scope) and [`scope_mut`](Self::scope_mut)
/// must not be held across a call back into the registry.
#[derive(Debug, Clone, Default)]
pub struct Context {
    name: Arc<str>,
    scope: Arc<RwLock<Scope>>,
}

impl Context {
    /// Create a context with an empty scope of the same name.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            scope: Arc::new(RwLock::new(Scope::new(name.clone()))),
            name: name.into(),
        }
    }

    /// The context name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared access to the scope.
    pub fn scope(&self) -> RwLockReadGuard<'_, Scope> {
        self.scope.read()
    }

    /// Exclusive access to the scope.
    pub fn scope_mut(&self) -> RwLockWriteGuard<'_, Scope> {
        self.scope.write()
    }

    /// Bind `name` to `object`, returning the previous binding if any.
    ///
    /// The previous binding is returned after the lock is released, so
    /// dropping it never runs a payload's `destroy` under the scope lock.
    pub fn define(
        &self,
        name: impl Into<String>,
        object: impl Into<Object>,
    ) -> Option<Arc<Object>> {
        self.scope.write().define(name, object)
    }

    /// Look up `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Object>> {
        self.scope.read().get(name).cloned()
    }

    /// Remove every binding.
    ///
    /// Objects are released after the scope lock is dropped.
    pub fn clear(&self) {
        let released = self.scope.write().drain();
        drop(released);
    }

    /// Check if both contexts share one scope.
    pub fn shares_scope(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.scope, &other.scope)
    }
}
