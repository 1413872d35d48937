//! Flat name → object symbol tables.
//!
//! A [`Scope`] is owned by a [`Context`](crate::Context), one per
//! implementation. Lookup is an exact match on the name; there is no
//! namespacing.
//!
//! # Redefinition
//!
//! Defining a name that already exists **replaces** the previous binding
//! (last write wins) and hands the previous object back to the caller. The
//! replaced object keeps its original position in definition order. Once
//! the caller drops the returned `Arc`, and nobody else holds a clone, a
//! replaced function's payload is destroyed.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::Object;

/// Symbol table mapping names to objects, in definition order.
#[derive(Debug, Default)]
pub struct Scope {
    name: String,
    objects: IndexMap<String, Arc<Object>, FxBuildHasher>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: IndexMap::default(),
        }
    }

    /// The scope's name (normally its implementation's tag).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `name` to `object`, returning the previous binding if any.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        object: impl Into<Object>,
    ) -> Option<Arc<Object>> {
        self.objects.insert(name.into(), Arc::new(object.into()))
    }

    /// Look up `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<Object>> {
        self.objects.get(name)
    }

    /// Remove the binding for `name`, preserving the order of the rest.
    pub fn undefine(&mut self, name: &str) -> Option<Arc<Object>> {
        self.objects.shift_remove(name)
    }

    /// Check if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scope has no bindings.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bound names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Bindings in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Object>)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Remove every binding.
    ///
    /// Objects not referenced elsewhere are released immediately.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Remove every binding and hand the objects back, in definition order.
    pub fn drain(&mut self) -> Vec<Arc<Object>> {
        self.objects.drain(..).map(|(_, object)| object).collect()
    }
}
