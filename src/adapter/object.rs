use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::trace;
use super::channel::Deferred;
use super::function::{invoke, Args, Function};

/// A shared handle to an ordered set of named properties.
///
/// Cloning the handle does not copy the properties; clones compare equal
/// under [`Object::ptr_eq`]. Methods are invoked with the object itself as
/// their receiver, so they can read and update its properties.
#[derive(Clone, Default)]
pub struct Object {
    props: Arc<RwLock<Vec<(String, Property)>>>,
}

#[derive(Clone, Debug)]
pub enum Property {
    Function(Function),
    Value(Value),
}

/// Invokes the method `name` on `target` with `target` as its receiver.
///
/// Fails immediately, before anything is invoked, if `name` is not a
/// function-valued property of `target`.
pub fn method<A: Args>(target: &Object, name: &str, args: A) -> Result<Deferred> {
    let function = target.function(name)?;
    let args     = args.args();
    trace!(args = args.len(), method = name, "adapt method");
    Ok(invoke(&function, Some(target), args))
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<P: Into<Property>>(self, key: &str, value: P) -> Self {
        self.set(key, value);
        self
    }

    pub fn promise<A: Args>(&self, name: &str, args: A) -> Result<Deferred> {
        method(self, name, args)
    }

    /// Sets `key`, keeping its position if it already exists.
    pub fn set<P: Into<Property>>(&self, key: &str, value: P) {
        let mut props = self.write();
        let value = value.into();
        match props.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None            => props.push((key.to_owned(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Property> {
        self.read().iter().find(|(k, _)| k == key).map(|(_, p)| p.clone())
    }

    pub fn remove(&self, key: &str) -> Option<Property> {
        let mut props = self.write();
        let index = props.iter().position(|(k, _)| k == key)?;
        Some(props.remove(index).1)
    }

    pub fn function(&self, key: &str) -> Result<Function> {
        match self.get(key) {
            Some(Property::Function(f)) => Ok(f),
            Some(Property::Value(_)) | None => Err(anyhow!("{key} is not a function")),
        }
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        match self.get(key)? {
            Property::Value(v)    => Some(v),
            Property::Function(_) => None,
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().iter().map(|(k, _)| k.clone()).collect()
    }

    /// A point-in-time copy of every property, in insertion order.
    pub fn entries(&self) -> Vec<(String, Property)> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.props, &other.props)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(String, Property)>> {
        self.props.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, Property)>> {
        self.props.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Property {
    pub fn is_function(&self) -> bool {
        matches!(self, Property::Function(_))
    }
}

impl From<Function> for Property {
    fn from(f: Function) -> Self {
        Property::Function(f)
    }
}

impl From<Value> for Property {
    fn from(v: Value) -> Self {
        Property::Value(v)
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Property::Value(s.into())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use anyhow::anyhow;
    use serde_json::{json, Value};
    use crate::adapter::Function;
    use super::{method, Object, Property};

    fn get_self(seen: Arc<Mutex<Vec<Option<Object>>>>) -> Function {
        Function::new(move |this, _, cb| {
            seen.lock().unwrap().push(this.cloned());
            cb.resolve(Value::Null)
        })
    }

    #[test]
    fn receiver_is_target() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let lib  = Object::new().with("getSelf", get_self(seen.clone()));

        method(&lib, "getSelf", ()).unwrap().recv().unwrap();
        method(&lib, "getSelf", (1, 2, 3)).unwrap().recv().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for this in seen.iter() {
            assert!(this.as_ref().unwrap().ptr_eq(&lib));
        }
    }

    #[test]
    fn methods_use_receiver_state() {
        let incr = Function::new(|this, args, cb| {
            let this  = this.unwrap();
            let step  = args.first().and_then(Value::as_i64).unwrap_or(1);
            let count = this.value("count").and_then(|v| v.as_i64()).unwrap_or(0) + step;
            this.set("count", json!(count));
            cb.resolve(json!(count))
        });
        let counter = Object::new().with("count", json!(0)).with("incr", incr);

        assert_eq!(counter.promise("incr", ()).unwrap().recv().unwrap(), json!(1));
        assert_eq!(counter.promise("incr", json!(5)).unwrap().recv().unwrap(), json!(6));
        assert_eq!(counter.value("count"), Some(json!(6)));
    }

    #[test]
    fn missing_method_fails_fast() {
        let lib = Object::new().with("name", "lib");
        let err = method(&lib, "nope", ()).err().unwrap();
        assert_eq!(err.to_string(), "nope is not a function");
        let err = method(&lib, "name", ()).err().unwrap();
        assert_eq!(err.to_string(), "name is not a function");
    }

    #[test]
    fn method_errors_reject() {
        let fail = Function::new(|_, _, cb| cb.call(Some(anyhow!("oops")), Value::Null));
        let lib  = Object::new().with("fail", fail);
        let err  = method(&lib, "fail", ()).unwrap().recv().unwrap_err();
        assert_eq!(err.to_string(), "oops");
    }

    #[test]
    fn properties_keep_insertion_order() {
        let lib = Object::new().with("b", json!(1)).with("a", json!(2)).with("c", json!(3));
        lib.set("a", json!(4));
        assert_eq!(lib.keys(), vec!["b", "a", "c"]);
        assert_eq!(lib.value("a"), Some(json!(4)));

        assert!(matches!(lib.remove("b"), Some(Property::Value(_))));
        assert_eq!(lib.keys(), vec!["a", "c"]);
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn clones_share_properties() {
        let lib   = Object::new();
        let clone = lib.clone();
        clone.set("x", json!(1));
        assert_eq!(lib.value("x"), Some(json!(1)));
        assert!(lib.ptr_eq(&clone));
        assert!(!lib.ptr_eq(&Object::new()));
    }
}
