//! Error types for the polyload runtime.
//!
//! Every fallible operation in the workspace returns one of the phase-specific
//! errors below, or the aggregate [`PolyloadError`] when an operation spans
//! several phases (resolving an implementation and then loading into it).
//!
//! ## Error Hierarchy
//!
//! ```text
//! PolyloadError (top-level wrapper)
//! ├── ConfigError       - registry not initialized, invalid tags, bad paths
//! ├── AdapterError      - adapter construction / execution path failures
//! ├── LoadError         - adapter-specific load failures, rejected batches
//! ├── RegistrationError - host function registration failures
//! └── InvokeError       - trampoline and native callback failures
//! ```
//!
//! A lookup miss is not an error: `Registry::get` and `Scope::get` return
//! `None`.

use std::path::PathBuf;

use thiserror::Error;

use crate::TypeId;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised while resolving configuration or validating identifiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The registry was used before `initialize()` (or after `destroy()`).
    #[error("registry is not initialized")]
    NotInitialized,

    /// A tag failed validation.
    #[error("invalid tag '{tag}': {reason}")]
    InvalidTag {
        /// The rejected tag.
        tag: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An environment-sourced value could not be used.
    #[error("invalid value for {variable}: {reason}")]
    InvalidVariable {
        /// The environment variable name.
        variable: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The host proxy could not be bootstrapped during initialization.
    #[error("host proxy bootstrap failed: {0}")]
    HostProxy(String),
}

// ============================================================================
// Adapter Errors
// ============================================================================

/// Errors raised while constructing or configuring an implementation.
///
/// Any of these during `get_or_create` triggers a rollback: the partially
/// built implementation is removed from the registry and destroyed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// No factory is registered for the tag.
    #[error("no adapter available for tag '{tag}'")]
    NoFactory {
        /// The requested tag.
        tag: String,
    },

    /// The factory failed to construct the adapter.
    #[error("adapter '{tag}' creation failed: {reason}")]
    CreationFailed {
        /// The adapter tag.
        tag: String,
        /// Adapter-provided failure description.
        reason: String,
    },

    /// The adapter rejected an execution path.
    #[error("adapter '{tag}' rejected execution path {}: {reason}", path.display())]
    ExecutionPath {
        /// The adapter tag.
        tag: String,
        /// The rejected path.
        path: PathBuf,
        /// Adapter-provided failure description.
        reason: String,
    },

    /// The implementation has already been destroyed.
    #[error("implementation '{tag}' has been destroyed")]
    Destroyed {
        /// The adapter tag.
        tag: String,
    },
}

// ============================================================================
// Load Errors
// ============================================================================

/// Errors raised by `load_from_file`, `load_from_memory` and
/// `load_from_package`.
///
/// A failed load leaves the registry map unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// `load_from_file` was called with no paths.
    #[error("no paths given to load")]
    EmptyBatch,

    /// More paths than the configured batch limit.
    #[error("batch of {count} paths exceeds the limit of {max}")]
    BatchTooLarge {
        /// Number of paths requested.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A joined path is longer than the configured limit.
    #[error("path {} exceeds the limit of {max} bytes", path.display())]
    PathTooLong {
        /// The offending path after joining.
        path: PathBuf,
        /// Configured maximum.
        max: usize,
    },

    /// A path has a root and cannot be joined onto the script path.
    #[error("path {} is absolute; script paths must be relative", path.display())]
    AbsolutePath {
        /// The path as given.
        path: PathBuf,
    },

    /// An empty memory buffer was given.
    #[error("empty buffer")]
    EmptyBuffer,

    /// The adapter does not support this kind of load.
    #[error("adapter '{tag}' does not support {operation}")]
    Unsupported {
        /// The adapter tag.
        tag: String,
        /// The refused operation.
        operation: &'static str,
    },

    /// The adapter reported a failure.
    #[error("adapter '{tag}' failed to load: {reason}")]
    Failed {
        /// The adapter tag.
        tag: String,
        /// Adapter-provided failure description.
        reason: String,
    },
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while registering a host function.
///
/// A failed registration defines nothing and releases the callback payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The function name is empty.
    #[error("function name is empty")]
    EmptyName,

    /// More parameters than a function descriptor can hold.
    #[error("function '{name}' declares {arity} parameters, the limit is {max}")]
    TooManyParameters {
        /// The function name.
        name: String,
        /// Declared parameter count.
        arity: usize,
        /// Maximum supported arity.
        max: usize,
    },

    /// A numeric type id does not name a known type.
    #[error("unknown type id {0}")]
    UnknownTypeId(u32),

    /// A parameter index is outside the signature.
    #[error("parameter index {index} out of range for arity {arity}")]
    ParameterOutOfRange {
        /// The index requested.
        index: usize,
        /// The signature arity.
        arity: usize,
    },
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Errors raised when a function is invoked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// The payload has already been released.
    #[error("function '{name}' has been released")]
    Released {
        /// The function name.
        name: String,
    },

    /// Wrong number of arguments.
    #[error("function '{name}' expects {expected} arguments, got {actual}")]
    ArgumentCount {
        /// The function name.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },

    /// An argument does not match the declared parameter type.
    #[error("function '{name}' argument {index}: expected {expected}, got {actual}")]
    ArgumentType {
        /// The function name.
        name: String,
        /// Argument position.
        index: usize,
        /// Declared type.
        expected: TypeId,
        /// Supplied type.
        actual: TypeId,
    },

    /// A value could not be converted to the native type.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The native callback reported a failure.
    #[error("{message}")]
    Native {
        /// The callback's message.
        message: String,
    },
}

impl InvokeError {
    /// Create a native failure from a message.
    pub fn native(message: impl Into<String>) -> Self {
        InvokeError::Native {
            message: message.into(),
        }
    }
}

/// Errors converting between [`Value`](crate::Value) and Rust types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The value holds a different type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type name.
        expected: &'static str,
        /// The actual type name.
        actual: &'static str,
    },

    /// An integer does not fit the target type.
    #[error("integer overflow: {value} doesn't fit in {target_type}")]
    IntegerOverflow {
        /// The value that overflowed.
        value: i64,
        /// The target type.
        target_type: &'static str,
    },
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for registry operations.
///
/// Each variant uses `#[from]` so `?` converts phase errors automatically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolyloadError {
    /// A configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An adapter creation error.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A load error.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A registration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// An invocation error.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl PolyloadError {
    /// Nonzero status code for this error category.
    ///
    /// `0` is reserved for success, so callers bridging to a status-code
    /// interface can map `Ok(_)` to `0` and `Err(e)` to `e.code()`.
    pub fn code(&self) -> i32 {
        match self {
            PolyloadError::Config(_) => 1,
            PolyloadError::Adapter(_) => 2,
            PolyloadError::Load(_) => 3,
            PolyloadError::Registration(_) => 4,
            PolyloadError::Invoke(_) => 5,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, PolyloadError::Config(_))
    }

    /// Check if this is an adapter error.
    pub fn is_adapter(&self) -> bool {
        matches!(self, PolyloadError::Adapter(_))
    }

    /// Check if this is a load error.
    pub fn is_load(&self) -> bool {
        matches!(self, PolyloadError::Load(_))
    }

    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, PolyloadError::Registration(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn adapter_error_display() {
        let err = AdapterError::ExecutionPath {
            tag: "py".to_string(),
            path: PathBuf::from("scripts"),
            reason: "not a directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "adapter 'py' rejected execution path scripts: not a directory"
        );
    }

    #[test]
    fn load_error_display() {
        let err = LoadError::BatchTooLarge { count: 300, max: 256 };
        assert_eq!(err.to_string(), "batch of 300 paths exceeds the limit of 256");

        let err = LoadError::AbsolutePath {
            path: PathBuf::from("/etc/passwd"),
        };
        assert_eq!(
            err.to_string(),
            "path /etc/passwd is absolute; script paths must be relative"
        );
    }

    #[test]
    fn invoke_error_from_conversion() {
        let err: InvokeError = ConversionError::TypeMismatch {
            expected: "int",
            actual: "string",
        }
        .into();
        assert!(matches!(err, InvokeError::Conversion(_)));
        assert_eq!(err.to_string(), "type mismatch: expected int, got string");
    }

    #[test]
    fn status_codes_are_nonzero_and_distinct() {
        let errors: Vec<PolyloadError> = vec![
            ConfigError::NotInitialized.into(),
            AdapterError::NoFactory { tag: "rb".into() }.into(),
            LoadError::EmptyBatch.into(),
            RegistrationError::EmptyName.into(),
            InvokeError::native("boom").into(),
        ];
        let codes: Vec<i32> = errors.iter().map(PolyloadError::code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        let distinct: FxHashSet<i32> = codes.iter().copied().collect();
        assert_eq!(distinct.len(), errors.len());
    }

    #[test]
    fn category_predicates() {
        let err: PolyloadError = LoadError::EmptyBuffer.into();
        assert!(err.is_load());
        assert!(!err.is_adapter());
        assert!(!err.is_config());
        assert!(!err.is_registration());
    }
}
