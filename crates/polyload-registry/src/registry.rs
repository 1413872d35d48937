//! Registry - tag → implementation map and cross-adapter symbol lookup.
//!
//! This module provides [`Registry`], the value every loader entry point goes
//! through. It owns the live implementations, the factories that create
//! them and the library/script paths they are configured with.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Ready --unload--> Unloaded
//!       ^                                            |
//!       +------------------destroy-------------------+
//! ```
//!
//! `initialize`, `unload` and `destroy` are idempotent. `destroy` may be
//! called from any state.
//!
//! # Lookup Order
//!
//! [`Registry::get`] consults implementations in **registration order** and
//! returns the first match. The host proxy is registered by `initialize`, so
//! host functions shadow same-named symbols defined by language adapters
//! created later.
//!
//! # Thread Safety
//!
//! The map sits behind a single `RwLock`. Creating, unloading and
//! destroying implementations take the write lock, so two threads asking for
//! the same unseen tag produce one implementation.
//!
//! Every implementation has a load lock, held for the whole of an adapter
//! call, which serializes loads per adapter without blocking unrelated
//! ones. The registry never waits for a load lock while holding its own
//! lock: loads resolve their handle and release the registry lock first,
//! and `unload`/`destroy` empty the map before destroying what they took
//! out. Lookups copy the handles out of the map and then read each scope
//! directly, without touching any load lock.
//!
//! An adapter may therefore call [`Registry::get`] while it is loading, for
//! example to resolve an import or from a host callback. What it must not
//! do is call [`Registry::get_or_create`] for an unseen tag, `unload` or
//! `destroy` from inside a factory or an execution path callback, which run
//! under the registry's write lock.
//!
//! Adapter loads are not cancellable: a stuck load blocks its caller, and
//! any `unload` that has to destroy the same implementation, until it
//! returns.
//!
//! # Example
//!
//! ```
//! use polyload_registry::{LoaderConfig, Registry, RegistryState};
//!
//! let registry = Registry::new(LoaderConfig::default().without_script_path());
//! registry.initialize();
//! assert_eq!(registry.state(), RegistryState::Ready);
//! assert!(registry.get("missing").is_none());
//!
//! registry.destroy();
//! registry.destroy();
//! assert_eq!(registry.state(), RegistryState::Uninitialized);
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use polyload_core::{
    AdapterError, ConfigError, Function, InvokeError, LoadError, Object, PolyloadError,
    RegistrationError, TypeId, Value,
};
use rustc_hash::FxHashMap;
use tracing::{debug, error, warn};

use crate::adapter::AdapterFactory;
use crate::config::{LoaderConfig, ResolvedPaths};
use crate::host::{HostInvoke, build_host_function};
use crate::implementation::{Implementation, ImplementationHandle};
use crate::tag::Tag;

/// Lifecycle state of a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// No map, no paths. Initial state and the state after `destroy`.
    Uninitialized,
    /// Map and paths present; the host proxy was bootstrapped.
    Ready,
    /// Every implementation destroyed; paths retained.
    Unloaded,
}

struct RegistryInner {
    state: RegistryState,
    /// `None` while uninitialized.
    implementations: Option<IndexMap<Tag, ImplementationHandle>>,
    /// Resolved on first initialization, released by `destroy`.
    paths: Option<ResolvedPaths>,
}

/// Process-wide map from tags to live implementations.
///
/// Create one per embedding and pass it (or an `Arc` of it) to whatever
/// needs to load or resolve code.
pub struct Registry {
    config: LoaderConfig,
    factories: RwLock<FxHashMap<Tag, Arc<dyn AdapterFactory>>>,
    inner: RwLock<RegistryInner>,
}

impl Registry {
    /// Create an uninitialized registry with no adapter factories.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            factories: RwLock::new(FxHashMap::default()),
            inner: RwLock::new(RegistryInner {
                state: RegistryState::Uninitialized,
                implementations: None,
                paths: None,
            }),
        }
    }

    /// Create an uninitialized registry configured from the environment.
    pub fn from_env() -> Self {
        Self::new(LoaderConfig::from_env())
    }

    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The configuration this registry was created with.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Register the factory used to create implementations for `tag`.
    ///
    /// Replaces any earlier factory for the tag; implementations it already
    /// created stay alive until unloaded.
    ///
    /// # Errors
    ///
    /// The host proxy tag is reserved.
    pub fn add_factory(
        &self,
        tag: Tag,
        factory: impl AdapterFactory + 'static,
    ) -> Result<(), ConfigError> {
        if tag.is_host() {
            return Err(ConfigError::InvalidTag {
                tag: tag.to_string(),
                reason: "tag is reserved for the host proxy",
            });
        }
        self.factories.write().insert(tag, Arc::new(factory));
        Ok(())
    }

    // ==========================================================================
    // Lifecycle
    // ==========================================================================

    /// Create the map, resolve paths and bootstrap the host proxy.
    ///
    /// Each step runs only if its result is missing, so calling this again
    /// is a no-op. A host proxy failure is logged, not returned; later
    /// registrations report it.
    pub fn initialize(&self) {
        let mut inner = self.inner.write();
        self.initialize_locked(&mut inner);
    }

    fn initialize_locked(&self, inner: &mut RegistryInner) {
        if inner.implementations.is_none() {
            inner.implementations = Some(IndexMap::new());
        }

        if inner.paths.is_none() {
            inner.paths = Some(self.config.resolve());
        }

        let host = Tag::host();
        let has_host = inner
            .implementations
            .as_ref()
            .is_some_and(|map| map.contains_key(&host));
        if !has_host {
            if let Err(e) = self.create_locked(inner, &host) {
                error!(error = %e, "Loader invalid proxy initialization");
            }
        }

        inner.state = RegistryState::Ready;
    }

    /// Initialize first if the registry is lazy.
    fn ensure_lazy_initialized(&self) {
        if self.config.lazy && self.state() == RegistryState::Uninitialized {
            debug!("Loader lazy initialization");
            self.initialize();
        }
    }

    /// Destroy every implementation and empty the map.
    ///
    /// Implementations are destroyed in reverse registration order, so the
    /// host proxy goes last. Paths are kept. In lazy mode this also destroys
    /// the registry.
    pub fn unload(&self) {
        let released = {
            let mut inner = self.inner.write();
            let released = Self::take_implementations(&mut inner);
            if self.config.lazy {
                debug!("Loader lazy destruction");
                Self::release(&mut inner);
            }
            released
        };
        Self::destroy_all(released);
    }

    /// Empty the map, returning its handles in registration order.
    fn take_implementations(inner: &mut RegistryInner) -> Vec<ImplementationHandle> {
        let Some(map) = inner.implementations.as_mut() else {
            return Vec::new();
        };
        let released = map.drain(..).map(|(_, handle)| handle).collect();

        if inner.state == RegistryState::Ready {
            inner.state = RegistryState::Unloaded;
        }
        released
    }

    fn release(inner: &mut RegistryInner) {
        inner.implementations = None;
        inner.paths = None;
        inner.state = RegistryState::Uninitialized;
    }

    /// Destroy in reverse registration order. Runs without the registry
    /// lock, waiting on each load lock in turn.
    fn destroy_all(released: Vec<ImplementationHandle>) {
        for handle in released.iter().rev() {
            debug!(tag = %handle.tag(), id = %handle.id(), "Unloading loader implementation");
            handle.lock().destroy();
        }
    }

    /// Unload, then release the map and both paths.
    ///
    /// Returns the registry to [`RegistryState::Uninitialized`]; safe to
    /// call repeatedly.
    pub fn destroy(&self) {
        let released = {
            let mut inner = self.inner.write();
            let released = Self::take_implementations(&mut inner);
            Self::release(&mut inner);
            released
        };
        Self::destroy_all(released);
    }

    // ==========================================================================
    // Implementations
    // ==========================================================================

    /// Return the live implementation for `tag`, creating it on first use.
    ///
    /// Creation constructs the adapter through its factory, inserts it, then
    /// configures two execution paths: `"."` and the script path (if set).
    /// If any step fails the entry is removed and the adapter destroyed
    /// before the error is returned.
    ///
    /// Creation runs the factory and the execution path calls under the
    /// registry's write lock; neither may call back into this registry.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotInitialized`] before `initialize`
    /// - [`AdapterError::NoFactory`] if no factory handles `tag`
    /// - any construction or execution path failure
    pub fn get_or_create(&self, tag: &str) -> Result<ImplementationHandle, PolyloadError> {
        let tag = Tag::new(tag)?;

        {
            let inner = self.inner.read();
            let map = inner
                .implementations
                .as_ref()
                .ok_or(ConfigError::NotInitialized)?;
            if let Some(handle) = map.get(&tag) {
                return Ok(handle.clone());
            }
        }

        let mut inner = self.inner.write();
        // Another writer may have created it between the two locks.
        if let Some(handle) = inner
            .implementations
            .as_ref()
            .and_then(|map| map.get(&tag))
        {
            return Ok(handle.clone());
        }
        self.create_locked(&mut inner, &tag)
    }

    fn create_locked(
        &self,
        inner: &mut RegistryInner,
        tag: &Tag,
    ) -> Result<ImplementationHandle, PolyloadError> {
        let paths = inner.paths.clone().ok_or(ConfigError::NotInitialized)?;
        let map = inner
            .implementations
            .as_mut()
            .ok_or(ConfigError::NotInitialized)?;

        let implementation = if tag.is_host() {
            Implementation::host()
        } else {
            let factory = self
                .factories
                .read()
                .get(tag)
                .cloned()
                .ok_or_else(|| AdapterError::NoFactory {
                    tag: tag.to_string(),
                })?;
            let adapter = factory.create(tag, &paths.library_path)?;
            Implementation::language(tag.clone(), adapter)
        };

        let handle = ImplementationHandle::new(implementation);
        debug_assert!(!map.contains_key(tag), "{tag} created twice");
        map.insert(tag.clone(), handle.clone());

        if let Err(e) = Self::configure(&handle, paths.script_path.as_deref()) {
            warn!(%tag, error = %e, "Rolling back loader implementation");
            map.shift_remove(tag);
            handle.lock().destroy();
            return Err(e.into());
        }

        debug!(%tag, id = %handle.id(), "Created loader implementation");
        Ok(handle)
    }

    fn configure(
        handle: &ImplementationHandle,
        script_path: Option<&Path>,
    ) -> Result<(), AdapterError> {
        let mut implementation = handle.lock();
        implementation.execution_path(Path::new("."))?;
        if let Some(script_path) = script_path {
            implementation.execution_path(script_path)?;
        }
        Ok(())
    }

    // ==========================================================================
    // Loading
    // ==========================================================================

    /// Load source files through the adapter for `tag`.
    ///
    /// Each path is joined onto the script path (used as-is when no script
    /// path is configured). The batch is validated before the
    /// implementation is resolved, so a rejected batch has no side effects.
    ///
    /// # Errors
    ///
    /// - [`LoadError::EmptyBatch`] / [`LoadError::BatchTooLarge`]
    /// - [`LoadError::AbsolutePath`] if a script path is configured and a
    ///   path has a root or prefix, which would escape it when joined
    /// - [`LoadError::PathTooLong`] if a joined path exceeds the limit
    /// - any error from [`get_or_create`](Self::get_or_create)
    /// - the adapter's load failure
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load_from_file<P: AsRef<Path>>(
        &self,
        tag: &str,
        paths: &[P],
    ) -> Result<(), PolyloadError> {
        self.ensure_lazy_initialized();

        if paths.is_empty() {
            return Err(LoadError::EmptyBatch.into());
        }
        if paths.len() > self.config.max_batch_size {
            return Err(LoadError::BatchTooLarge {
                count: paths.len(),
                max: self.config.max_batch_size,
            }
            .into());
        }

        let script_path = self.script_path_checked()?;
        let absolute = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let joined = match &script_path {
                    Some(_) if is_rooted(path) => {
                        return Err(LoadError::AbsolutePath {
                            path: path.to_path_buf(),
                        });
                    }
                    Some(base) => base.join(path),
                    None => path.to_path_buf(),
                };
                if joined.as_os_str().len() > self.config.max_path_length {
                    Err(LoadError::PathTooLong {
                        path: joined,
                        max: self.config.max_path_length,
                    })
                } else {
                    Ok(joined)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let handle = self.get_or_create(tag)?;
        debug!(%tag, id = %handle.id(), count = absolute.len(), "Loading from file");
        handle.lock().load_from_file(&absolute)
    }

    /// Load source from a buffer through the adapter for `tag`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load_from_memory(&self, tag: &str, buffer: &[u8]) -> Result<(), PolyloadError> {
        self.ensure_lazy_initialized();

        let handle = self.get_or_create(tag)?;
        debug!(%tag, id = %handle.id(), size = buffer.len(), "Loading from memory");
        handle.lock().load_from_memory(buffer)
    }

    /// Load a package through the adapter for `tag`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load_from_package(&self, tag: &str, path: impl AsRef<Path>) -> Result<(), PolyloadError> {
        self.ensure_lazy_initialized();

        let path = path.as_ref();
        let handle = self.get_or_create(tag)?;
        debug!(%tag, id = %handle.id(), path = %path.display(), "Loading from package");
        handle.lock().load_from_package(path)
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Resolve `name` across every live implementation.
    ///
    /// Implementations are consulted in registration order; the first one
    /// defining `name` wins. `None` is a normal miss, not an error.
    ///
    /// Lookups never wait for a load: an implementation in the middle of a
    /// load is searched with whatever it has defined so far. That makes this
    /// safe to call from inside an adapter's load, including the adapter
    /// being loaded, and from host callbacks invoked by loaded code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get(&self, name: &str) -> Option<Arc<Object>> {
        let handles: Vec<ImplementationHandle> = {
            let inner = self.inner.read();
            inner.implementations.as_ref()?.values().cloned().collect()
        };

        handles.iter().find_map(|handle| {
            let object = handle.get(name)?;
            debug!(name, tag = %handle.tag(), "Loader get resolved");
            Some(object)
        })
    }

    // ==========================================================================
    // Host Registration
    // ==========================================================================

    /// Expose a host callback to loaded code as a function named `name`.
    ///
    /// The callback is boxed into a trampoline payload owned by the new
    /// function, whose signature declares `arg_types` and `return_type`.
    /// Registering an existing name replaces the previous function.
    ///
    /// Either the function is fully built and defined, or nothing is defined
    /// and the callback has been dropped.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::EmptyName`]
    /// - [`RegistrationError::TooManyParameters`]
    /// - any error resolving the host proxy
    /// - [`AdapterError::Destroyed`] if an `unload` or `destroy` tore the
    ///   host proxy down while this call was in flight
    pub fn register<F>(
        &self,
        name: &str,
        callback: F,
        return_type: TypeId,
        arg_types: &[TypeId],
    ) -> Result<(), PolyloadError>
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.ensure_lazy_initialized();

        let host = self.get_or_create(crate::HOST_PROXY_TAG)?;
        let function =
            build_host_function(name, HostInvoke::new(callback), return_type, arg_types)?;

        let previous = Self::define_in_host(&host, name, function)?;
        if previous.is_some() {
            debug!(name, "Replaced host function");
        }
        debug!(name, arity = arg_types.len(), "Registered host function");
        Ok(())
    }

    /// Define under the host's load lock, so a concurrent teardown either
    /// runs first and is reported, or runs after and releases the function.
    fn define_in_host(
        host: &ImplementationHandle,
        name: &str,
        function: Function,
    ) -> Result<Option<Arc<Object>>, AdapterError> {
        let implementation = host.lock();
        implementation.check_live()?;
        Ok(implementation.context().define(name, function))
    }

    /// [`register`](Self::register) with numeric type ids.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::UnknownTypeId`] if any id is not a [`TypeId`];
    /// the callback is dropped and nothing is defined.
    pub fn register_raw<F>(
        &self,
        name: &str,
        callback: F,
        return_type: u32,
        arg_types: &[u32],
    ) -> Result<(), PolyloadError>
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        let convert =
            |id: u32| TypeId::try_from(id).map_err(|_| RegistrationError::UnknownTypeId(id));
        let return_type = convert(return_type)?;
        let arg_types = arg_types
            .iter()
            .copied()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()?;
        self.register(name, callback, return_type, &arg_types)
    }

    // ==========================================================================
    // Introspection
    // ==========================================================================

    /// Current lifecycle state.
    pub fn state(&self) -> RegistryState {
        self.inner.read().state
    }

    /// Resolved library path, once initialized.
    pub fn library_path(&self) -> Option<PathBuf> {
        self.inner
            .read()
            .paths
            .as_ref()
            .map(|p| p.library_path.clone())
    }

    /// Resolved script path, once initialized and if configured.
    pub fn script_path(&self) -> Option<PathBuf> {
        self.inner
            .read()
            .paths
            .as_ref()
            .and_then(|p| p.script_path.clone())
    }

    fn script_path_checked(&self) -> Result<Option<PathBuf>, ConfigError> {
        let inner = self.inner.read();
        if inner.implementations.is_none() {
            return Err(ConfigError::NotInitialized);
        }
        Ok(inner.paths.as_ref().and_then(|p| p.script_path.clone()))
    }

    /// Tags of live implementations, in registration order.
    pub fn tags(&self) -> Vec<Tag> {
        self.inner
            .read()
            .implementations
            .as_ref()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Check if an implementation for `tag` is live.
    pub fn contains(&self, tag: &str) -> bool {
        self.inner
            .read()
            .implementations
            .as_ref()
            .is_some_and(|map| map.contains_key(tag))
    }

    /// Number of live implementations.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .implementations
            .as_ref()
            .map_or(0, IndexMap::len)
    }

    /// Check if no implementation is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Version and build information.
    pub fn info(&self) -> String {
        let mode = if self.config.lazy {
            "lazy initialization and destruction"
        } else {
            "explicit initialization and destruction"
        };
        format!(
            "Polyload Registry {}\nRunning with {}\n",
            env!("CARGO_PKG_VERSION"),
            mode
        )
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        let released = Self::take_implementations(inner);
        Self::release(inner);
        Self::destroy_all(released);
    }
}

/// Check if `path` starts with a root or a drive prefix.
fn is_rooted(path: &Path) -> bool {
    matches!(
        path.components().next(),
        Some(Component::RootDir | Component::Prefix(_))
    )
}

// ==========================================================================
// Builder
// ==========================================================================

/// Builder collecting configuration and factories for a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    config: LoaderConfig,
    factories: Vec<(Tag, Arc<dyn AdapterFactory>)>,
}

impl RegistryBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config`.
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Add the factory for `tag`.
    pub fn factory(mut self, tag: Tag, factory: impl AdapterFactory + 'static) -> Self {
        self.factories.push((tag, Arc::new(factory)));
        self
    }

    /// Build the registry, uninitialized.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidTag`] if a factory targets the host proxy tag.
    pub fn build(self) -> Result<Registry, ConfigError> {
        let registry = Registry::new(self.config);
        {
            let mut factories = registry.factories.write();
            for (tag, factory) in self.factories {
                if tag.is_host() {
                    return Err(ConfigError::InvalidTag {
                        tag: tag.to_string(),
                        reason: "tag is reserved for the host proxy",
                    });
                }
                factories.insert(tag, factory);
            }
        }
        Ok(registry)
    }
}
