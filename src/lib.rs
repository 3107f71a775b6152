//! Adapts callables that follow the error-first callback convention into
//! calls returning a [`Deferred`] value.
//!
//! ```
//! use promify::{adapt, Function};
//! use serde_json::{json, Value};
//!
//! let arrayify = Function::new(|_, args, cb| cb.resolve(Value::Array(args)));
//! let deferred = adapt(&arrayify, (1, 2, 3));
//! assert_eq!(deferred.recv().unwrap(), json!([1, 2, 3]));
//! ```

pub use adapter::{adapt, method, partial, partial_method, promisify};
pub use adapter::{Args, Callable, Callback, Deferred, Function, Object, Property};

pub mod adapter;
