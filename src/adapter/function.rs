use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use anyhow::anyhow;
use serde_json::Value;
use tracing::{error, trace};
use super::callback::Callback;
use super::channel::Deferred;
use super::object::Object;

/// A callable following the error-first callback convention.
///
/// `this` is the receiver the callable was invoked on: `None` for a bare
/// function call, the owning object for a method call. The callable must
/// eventually settle `callback` exactly once.
pub trait Callable: Send + Sync + 'static {
    fn call(&self, this: Option<&Object>, args: Vec<Value>, callback: Callback);
}

#[derive(Clone)]
pub struct Function {
    inner: Arc<dyn Callable>,
}

pub trait Args {
    fn args(self) -> Vec<Value>;
}

/// Invokes `function` with `args` and a fresh callback, returning the
/// deferred value the callback settles.
pub fn adapt<A: Args>(function: &Function, args: A) -> Deferred {
    let args = args.args();
    trace!(args = args.len(), "adapt function");
    invoke(function, None, args)
}

pub(crate) fn invoke(function: &Function, this: Option<&Object>, args: Vec<Value>) -> Deferred {
    let (callback, rx) = Callback::channel();
    let guard = callback.clone();

    let result = catch_unwind(AssertUnwindSafe(|| {
        function.inner.call(this, args, callback);
    }));

    if let Err(payload) = result {
        let cause = panicked(payload.as_ref());
        error!("callable panicked: {cause}");
        guard.reject(anyhow!("callable panicked: {cause}"));
    }

    rx
}

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Object>, Vec<Value>, Callback) + Send + Sync + 'static,
    {
        Self::from_callable(f)
    }

    pub fn from_callable<C: Callable>(callable: C) -> Self {
        Self { inner: Arc::new(callable) }
    }

    pub fn promise<A: Args>(&self, args: A) -> Deferred {
        adapt(self, args)
    }

    /// Calls the function callback-style, without adapting it.
    pub fn call(&self, this: Option<&Object>, args: Vec<Value>, callback: Callback) {
        self.inner.call(this, args, callback);
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        let this  = Arc::as_ptr(&self.inner) as *const ();
        let other = Arc::as_ptr(&other.inner) as *const ();
        std::ptr::eq(this, other)
    }
}

impl<F> Callable for F
where
    F: Fn(Option<&Object>, Vec<Value>, Callback) + Send + Sync + 'static,
{
    fn call(&self, this: Option<&Object>, args: Vec<Value>, callback: Callback) {
        self(this, args, callback)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Arc::as_ptr(&self.inner) as *const ())
    }
}

fn panicked(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

impl Args for () {
    fn args(self) -> Vec<Value> {
        Vec::new()
    }
}

impl Args for Value {
    fn args(self) -> Vec<Value> {
        vec![self]
    }
}

impl Args for Vec<Value> {
    fn args(self) -> Vec<Value> {
        self
    }
}

impl Args for &[Value] {
    fn args(self) -> Vec<Value> {
        self.to_vec()
    }
}

impl<V: Into<Value>, const N: usize> Args for [V; N] {
    fn args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! tuple_args {
    ($($name:ident)+) => {
        impl<$($name: Into<Value>),+> Args for ($($name,)+) {
            #[allow(non_snake_case)]
            fn args(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_args!(A);
tuple_args!(A B);
tuple_args!(A B C);
tuple_args!(A B C D);
tuple_args!(A B C D E);
tuple_args!(A B C D E F);
