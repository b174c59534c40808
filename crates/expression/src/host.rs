//! Host binding boundary
//!
//! Member access, method calls, calls on callable values and indexing of
//! host objects all go through a [`HostResolver`]. The evaluator has no
//! knowledge of host types; it only sees [`Value`]s and this trait.
//!
//! Every method has a default that serves built-in values from the member
//! registry in [`crate::builtins`], so a host overrides only what it adds and
//! delegates the rest back to [`builtins`](crate::builtins).

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use formula_value::{HostHandle, Value};
use thiserror::Error;

use crate::builtins;

/// Outcome of a host operation
#[derive(Error, Debug)]
pub enum HostError {
    /// The target has no member with that name
    #[error("member not found")]
    NotFound,

    /// The member exists but cannot be called
    #[error("member is not callable")]
    NotCallable,

    /// The member was found but the host failed to produce a value
    #[error("host call failed: {0}")]
    Failed(#[source] Box<dyn StdError + Send + Sync>),
}

impl HostError {
    /// Create a failure from any error or message
    pub fn failed(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Failed(error.into())
    }
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Capability used by the evaluator to reach into values
pub trait HostResolver: Send + Sync {
    /// Read `target.name`
    fn resolve_member(&self, target: &Value, name: &str) -> HostResult<Value> {
        builtins::registry().get(target, name)
    }

    /// Call `target.name(args)`
    fn invoke(&self, target: &Value, name: &str, args: &[Value]) -> HostResult<Value> {
        builtins::registry().invoke(target, name, args)
    }

    /// Call a callable value directly: `f(args)`
    fn invoke_callable(&self, callable: &Value, args: &[Value]) -> HostResult<Value> {
        match callable {
            Value::Callable(handle) => handle
                .downcast_ref::<NativeFunction>()
                .ok_or(HostError::NotCallable)?
                .call(args),
            _ => Err(HostError::NotCallable),
        }
    }

    /// Index a value the evaluator cannot index itself: `target[index]`
    fn index(&self, _target: &Value, _index: &Value) -> HostResult<Value> {
        Err(HostError::NotFound)
    }
}

/// Resolver that only knows the built-in members
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl HostResolver for DefaultResolver {}

type NativeFn = dyn Fn(&[Value]) -> HostResult<Value> + Send + Sync;

/// A Rust closure exposed to expressions as a callable value
///
/// ```rust
/// use formula_expression::{NativeFunction, Value, VariableContext};
///
/// let double = NativeFunction::new("double", |args| {
///     let n = args.first().and_then(Value::as_number).unwrap_or_default();
///     Ok(Value::number(n * formula_expression::Decimal::TWO))
/// });
///
/// let mut ctx = VariableContext::new();
/// ctx.set("double", double.into_value());
/// let result = formula_expression::eval("double(21)", &ctx).unwrap();
/// assert_eq!(result, Value::integer(42));
/// ```
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    /// Create a new native function
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Function name, used as the value's type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function
    pub fn call(&self, args: &[Value]) -> HostResult<Value> {
        (self.func)(args)
    }

    /// Wrap the function as a [`Value::Callable`]
    pub fn into_value(self) -> Value {
        let name = Arc::clone(&self.name);
        Value::callable(HostHandle::named(self, name))
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl From<NativeFunction> for Value {
    fn from(func: NativeFunction) -> Self {
        func.into_value()
    }
}
