//! The host proxy: the implementation representing the embedding process.
//!
//! Host callbacks registered through
//! [`Registry::register`](crate::Registry::register) become [`Function`]s
//! in the host proxy's scope. Their payload is a [`HostInvoke`], the
//! trampoline that forwards generic [`Value`] arguments to the callback and
//! returns its result.

use std::fmt;
use std::path::{Path, PathBuf};

use polyload_core::{
    AdapterError, Context, Function, FunctionInterface, InvokeError, LoadError, Type, TypeId,
    Value,
};

use crate::adapter::{Adapter, Capabilities};
use crate::tag::HOST_PROXY_TAG;

/// Display name given to every host signature entry.
const HOST_PARAMETER_NAME: &str = "holder";

/// A host function callable from loaded code.
///
/// Implemented for every `Fn(&[Value]) -> Result<Value, InvokeError>`
/// closure that is `Send + Sync`.
pub trait NativeCallback: Send + Sync {
    /// Call the host function.
    fn call(&self, args: &[Value]) -> Result<Value, InvokeError>;
}

impl<F> NativeCallback for F
where
    F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, InvokeError> {
        (self)(args)
    }
}

/// Trampoline payload boxing a host callback.
///
/// Ownership of the box passes to the [`Function`] built around it; the
/// callback is released by `destroy` when that function is dropped.
pub struct HostInvoke {
    callback: Option<Box<dyn NativeCallback>>,
}

impl HostInvoke {
    /// Box `callback` as a trampoline payload.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Box an already type-erased callback.
    pub fn from_boxed(callback: Box<dyn NativeCallback>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Check if the callback has been released.
    pub fn is_released(&self) -> bool {
        self.callback.is_none()
    }
}

impl FunctionInterface for HostInvoke {
    fn invoke(&self, function: &Function, args: &[Value]) -> Result<Value, InvokeError> {
        let callback = self.callback.as_ref().ok_or_else(|| InvokeError::Released {
            name: function.name().to_string(),
        })?;
        callback.call(args)
    }

    fn destroy(&mut self) {
        self.callback = None;
    }
}

impl fmt::Debug for HostInvoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostInvoke")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Build a host function: name, trampoline payload and populated signature.
///
/// If the descriptor cannot be built the payload is dropped before this
/// returns, so a failed build leaves no callback behind.
pub(crate) fn build_host_function(
    name: &str,
    payload: HostInvoke,
    return_type: TypeId,
    arg_types: &[TypeId],
) -> Result<Function, polyload_core::RegistrationError> {
    let mut function = Function::new(name, arg_types.len(), Box::new(payload))?;

    let signature = function.signature_mut();
    for (index, ty) in arg_types.iter().enumerate() {
        signature.set(
            index,
            HOST_PARAMETER_NAME,
            Type::new(*ty, HOST_PARAMETER_NAME),
        )?;
    }
    signature.set_return(Type::new(return_type, HOST_PARAMETER_NAME));

    Ok(function)
}

/// Adapter holding the host's exported functions.
///
/// The host proxy loads nothing; its scope is populated only through
/// registration.
#[derive(Debug)]
pub struct HostProxy {
    context: Context,
}

impl HostProxy {
    /// Create an empty host proxy.
    pub fn new() -> Self {
        Self {
            context: Context::new(HOST_PROXY_TAG),
        }
    }
}

impl Default for HostProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for HostProxy {
    fn capabilities(&self) -> Capabilities {
        Capabilities::EXECUTION_PATH
    }

    fn execution_path(&mut self, _path: &Path) -> Result<(), AdapterError> {
        Ok(())
    }

    fn load_from_file(&mut self, _paths: &[PathBuf]) -> Result<(), LoadError> {
        Err(unsupported("load_from_file"))
    }

    fn load_from_memory(&mut self, _buffer: &[u8]) -> Result<(), LoadError> {
        Err(unsupported("load_from_memory"))
    }

    fn load_from_package(&mut self, _path: &Path) -> Result<(), LoadError> {
        Err(unsupported("load_from_package"))
    }

    fn context(&self) -> &Context {
        &self.context
    }
}

fn unsupported(operation: &'static str) -> LoadError {
    LoadError::Unsupported {
        tag: HOST_PROXY_TAG.to_string(),
        operation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyload_core::RegistrationError;

    fn add(args: &[Value]) -> Result<Value, InvokeError> {
        let a = args.first().and_then(Value::as_i64).unwrap_or(0);
        let b = args.get(1).and_then(Value::as_i64).unwrap_or(0);
        Ok(Value::Long(a + b))
    }

    #[test]
    fn trampoline_forwards_arguments() {
        let f = build_host_function(
            "add",
            HostInvoke::new(add),
            TypeId::Long,
            &[TypeId::Long, TypeId::Long],
        )
        .unwrap();
        assert_eq!(f.invoke(&[Value::Long(2), Value::Long(3)]), Ok(Value::Long(5)));
    }

    #[test]
    fn signature_uses_holder_names() {
        let f = build_host_function("add", HostInvoke::new(add), TypeId::Int, &[TypeId::Int])
            .unwrap();
        let param = f.signature().get(0).unwrap();
        assert_eq!(param.name, "holder");
        assert_eq!(param.ty, Type::new(TypeId::Int, "holder"));
        assert_eq!(f.signature().return_type().id, TypeId::Int);
    }

    #[test]
    fn released_payload_is_not_called() {
        let mut payload = HostInvoke::new(add);
        payload.destroy();
        assert!(payload.is_released());

        let f = Function::new("add", 0, Box::new(HostInvoke::new(add))).unwrap();
        assert_eq!(
            payload.invoke(&f, &[]),
            Err(InvokeError::Released {
                name: "add".to_string()
            })
        );
    }

    #[test]
    fn callback_errors_propagate() {
        let f = build_host_function(
            "fail",
            HostInvoke::new(|_: &[Value]| Err(InvokeError::native("nope"))),
            TypeId::Null,
            &[],
        )
        .unwrap();
        assert_eq!(f.invoke(&[]), Err(InvokeError::native("nope")));
    }

    #[test]
    fn too_many_parameters() {
        let types = vec![TypeId::Int; polyload_core::MAX_ARITY + 1];
        let err = build_host_function("wide", HostInvoke::new(add), TypeId::Int, &types)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::TooManyParameters { .. }));
    }

    #[test]
    fn host_proxy_refuses_loads() {
        let mut proxy = HostProxy::new();
        assert!(matches!(
            proxy.load_from_memory(b"1"),
            Err(LoadError::Unsupported { .. })
        ));
        assert!(proxy.execution_path(Path::new(".")).is_ok());
        assert_eq!(proxy.context().name(), HOST_PROXY_TAG);
    }
}
