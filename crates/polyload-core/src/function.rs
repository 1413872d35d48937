//! Typed callable descriptors.
//!
//! A [`Function`] pairs a name and [`Signature`] with a payload that
//! implements [`FunctionInterface`]. The payload is the function's private
//! state (a boxed host callback, an adapter's handle to a script function)
//! and the interface is its two-operation vtable: `invoke` and `destroy`.
//!
//! # Ownership
//!
//! The function exclusively owns its payload. `destroy` runs exactly once,
//! from `Drop`, whether the function is dropped directly or released as part
//! of a scope, context or implementation teardown. If construction fails the
//! payload is dropped before [`Function::new`] returns, so it is never
//! leaked and `destroy` is never called on a payload that was not attached.

use std::fmt;

use crate::error::{InvokeError, RegistrationError};
use crate::{Signature, Value};

/// Maximum number of parameters a function may declare.
pub const MAX_ARITY: usize = 255;

/// The invoke/destroy vtable of a function payload.
///
/// Implementors are the payload: whatever state the call needs lives in the
/// implementing type.
pub trait FunctionInterface: Send + Sync {
    /// Call the function.
    ///
    /// `function` is the descriptor that owns this payload, available for
    /// error messages and signature checks.
    fn invoke(&self, function: &Function, args: &[Value]) -> Result<Value, InvokeError>;

    /// Release resources held by the payload.
    ///
    /// Called exactly once, when the owning function is dropped. `invoke` is
    /// never called afterwards.
    fn destroy(&mut self) {}
}

/// A named, typed callable owned by a scope.
pub struct Function {
    name: String,
    signature: Signature,
    payload: Box<dyn FunctionInterface>,
}

impl Function {
    /// Create a function with `arity` parameters around `payload`.
    ///
    /// The signature starts with untyped parameters and a `null` return; fill
    /// it in with [`signature_mut`](Self::signature_mut).
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::EmptyName`] if `name` is empty
    /// - [`RegistrationError::TooManyParameters`] if `arity > MAX_ARITY`
    ///
    /// On error the payload is dropped here.
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        payload: Box<dyn FunctionInterface>,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if arity > MAX_ARITY {
            return Err(RegistrationError::TooManyParameters {
                name,
                arity,
                max: MAX_ARITY,
            });
        }

        Ok(Self {
            name,
            signature: Signature::with_arity(arity),
            payload,
        })
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    /// The declared signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Mutable access to the signature, for populating parameter types.
    pub fn signature_mut(&mut self) -> &mut Signature {
        &mut self.signature
    }

    /// Invoke the payload with `args`.
    ///
    /// Arguments are passed through unchecked; call
    /// [`check_args`](Self::check_args) first to validate them against the
    /// signature.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self.payload.invoke(self, args)
    }

    /// Validate `args` against the declared signature.
    pub fn check_args(&self, args: &[Value]) -> Result<(), InvokeError> {
        self.signature.check_args(&self.name, args)
    }
}

impl Drop for Function {
    fn drop(&mut self) {
        self.payload.destroy();
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Type, TypeId};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Payload that counts destroy calls and drops.
    struct Tracked {
        destroyed: Arc<AtomicUsize>,
        dropped: Arc<AtomicUsize>,
    }

    impl FunctionInterface for Tracked {
        fn invoke(&self, function: &Function, args: &[Value]) -> Result<Value, InvokeError> {
            Ok(Value::String(format!("{}/{}", function.name(), args.len())))
        }

        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tracked() -> (Box<Tracked>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicUsize::new(0));
        let payload = Box::new(Tracked {
            destroyed: destroyed.clone(),
            dropped: dropped.clone(),
        });
        (payload, destroyed, dropped)
    }

    #[test]
    fn invoke_passes_descriptor() {
        let (payload, _, _) = tracked();
        let f = Function::new("echo", 2, payload).unwrap();
        assert_eq!(
            f.invoke(&[Value::Int(1), Value::Int(2)]),
            Ok(Value::String("echo/2".into()))
        );
    }

    #[test]
    fn destroy_runs_once_on_drop() {
        let (payload, destroyed, dropped) = tracked();
        let f = Function::new("f", 0, payload).unwrap();
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
        drop(f);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_construction_releases_payload() {
        let (payload, destroyed, dropped) = tracked();
        let err = Function::new("wide", MAX_ARITY + 1, payload).unwrap_err();
        assert!(matches!(err, RegistrationError::TooManyParameters { .. }));
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_name_rejected() {
        let (payload, _, dropped) = tracked();
        assert_eq!(
            Function::new("", 0, payload).unwrap_err(),
            RegistrationError::EmptyName
        );
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn signature_is_populated_in_place() {
        let (payload, _, _) = tracked();
        let mut f = Function::new("neg", 1, payload).unwrap();
        f.signature_mut().set(0, "x", Type::of(TypeId::Int)).unwrap();
        f.signature_mut().set_return(Type::of(TypeId::Int));
        assert_eq!(f.arity(), 1);
        assert!(f.check_args(&[Value::Int(3)]).is_ok());
        assert!(f.check_args(&[Value::Bool(true)]).is_err());
    }
}
