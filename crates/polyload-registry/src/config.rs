//! Registry configuration.
//!
//! Paths are not read when a [`LoaderConfig`] is built; they are resolved
//! once, by [`Registry::initialize`](crate::Registry::initialize), and held
//! by the registry until it is destroyed.

use std::path::PathBuf;

use tracing::debug;

/// Environment variable naming the adapters' library directory.
pub const LIBRARY_PATH_VAR: &str = "LOADER_LIBRARY_PATH";
/// Environment variable naming the script directory.
pub const SCRIPT_PATH_VAR: &str = "LOADER_SCRIPT_PATH";
/// Environment variable enabling lazy initialization and destruction.
pub const LAZY_VAR: &str = "LOADER_LAZY";

/// Library path used when the environment does not provide one.
pub const DEFAULT_LIBRARY_PATH: &str = ".";
/// Script path used when the environment does not provide one.
pub const DEFAULT_SCRIPT_PATH: &str = "scripts";

/// Default limit on the byte length of a joined script path.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 4096;
/// Default limit on the number of paths in one `load_from_file` call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 256;

/// Where a path setting comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSource {
    /// Read the environment variable, falling back to the default.
    Environment,
    /// Use this path as given.
    Fixed(PathBuf),
    /// No path. For the script path this disables joining.
    Unset,
}

/// Paths resolved at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Directory adapters load their own libraries from.
    pub library_path: PathBuf,
    /// Directory script paths are joined onto, if any.
    pub script_path: Option<PathBuf>,
}

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Source of the library path. `Unset` resolves to `"."`.
    pub library_path: PathSource,
    /// Source of the script path.
    pub script_path: PathSource,
    /// Initialize on first load and destroy on unload.
    pub lazy: bool,
    /// Maximum byte length of a joined script path.
    pub max_path_length: usize,
    /// Maximum number of paths in one `load_from_file` call.
    pub max_batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_path: PathSource::Environment,
            script_path: PathSource::Environment,
            lazy: false,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl LoaderConfig {
    /// Default configuration with the lifecycle mode read from `LOADER_LAZY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lazy = lookup(LAZY_VAR).is_some_and(|v| parse_flag(&v));
        Self {
            lazy,
            ..Self::default()
        }
    }

    /// Use a fixed library path.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = PathSource::Fixed(path.into());
        self
    }

    /// Use a fixed script path.
    pub fn with_script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_path = PathSource::Fixed(path.into());
        self
    }

    /// Disable script path joining.
    pub fn without_script_path(mut self) -> Self {
        self.script_path = PathSource::Unset;
        self
    }

    /// Set the lifecycle mode.
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Set the joined path length limit.
    pub fn with_max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = max;
        self
    }

    /// Set the batch size limit.
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    /// Resolve paths from the process environment.
    pub fn resolve(&self) -> ResolvedPaths {
        self.resolve_with(|var| std::env::var(var).ok())
    }

    /// Resolve paths with an injectable environment lookup.
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> ResolvedPaths {
        let library_path = resolve_source(
            &self.library_path,
            LIBRARY_PATH_VAR,
            DEFAULT_LIBRARY_PATH,
            &lookup,
        )
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_PATH));
        let script_path = resolve_source(
            &self.script_path,
            SCRIPT_PATH_VAR,
            DEFAULT_SCRIPT_PATH,
            &lookup,
        );

        debug!(library_path = %library_path.display(), "Loader library path");
        if let Some(path) = &script_path {
            debug!(script_path = %path.display(), "Loader script path");
        }

        ResolvedPaths {
            library_path,
            script_path,
        }
    }
}

fn resolve_source(
    source: &PathSource,
    var: &str,
    default: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    match source {
        PathSource::Environment => Some(
            lookup(var)
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(default), PathBuf::from),
        ),
        PathSource::Fixed(path) => Some(path.clone()),
        PathSource::Unset => None,
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
