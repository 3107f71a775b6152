use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::{debug, trace};
use super::channel::Deferred;
use super::function::{invoke, Args, Function};
use super::object::{Object, Property};

/// A promisified copy of a library object.
///
/// Built once by [`promisify`]; it holds its own entries and does not
/// follow later changes to the library.
#[derive(Clone, Debug)]
pub struct Promisified {
    entries: Vec<(String, Entry)>,
}

#[derive(Clone, Debug)]
pub enum Entry {
    Method(Method),
    Function(Function),
    Value(Value),
}

/// A library method with its receiver bound, returning deferred values.
#[derive(Clone, Debug)]
pub struct Method {
    library:  Object,
    function: Function,
    name:     String,
}

/// Copies `library`, adapting the function-valued properties named in
/// `names`, or all of them when `names` is empty. Every other property is
/// carried over as is.
pub fn promisify(library: &Object, names: &[&str]) -> Result<Promisified> {
    let props = library.entries();

    if let Some(name) = names.iter().find(|n| !props.iter().any(|(k, _)| k.as_str() == **n)) {
        return Err(anyhow!("{name} is not a property"));
    }

    let selected = |key: &str| names.is_empty() || names.iter().any(|n| *n == key);

    let entries = props.into_iter().map(|(key, prop)| {
        let entry = match prop {
            Property::Function(f) if selected(&key) => Entry::Method(Method {
                library:  library.clone(),
                function: f,
                name:     key.clone(),
            }),
            Property::Function(f) => Entry::Function(f),
            Property::Value(v)    => Entry::Value(v),
        };
        (key, entry)
    }).collect::<Vec<_>>();

    let adapted = entries.iter().filter(|(_, e)| matches!(e, Entry::Method(_))).count();
    debug!(adapted, total = entries.len(), "promisified library");

    Ok(Promisified { entries })
}

impl Promisified {
    /// Calls a promisified method; fails if `name` is missing or was not
    /// adapted.
    pub fn call<A: Args>(&self, name: &str, args: A) -> Result<Deferred> {
        match self.get(name) {
            Some(Entry::Method(m)) => Ok(m.call(args)),
            Some(_) | None         => Err(anyhow!("{name} is not a promisified method")),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, e)| e)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        match self.get(name)? {
            Entry::Method(m) => Some(m),
            _                => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            Entry::Value(v) => Some(v),
            _               => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Method {
    pub fn call<A: Args>(&self, args: A) -> Deferred {
        let args = args.args();
        trace!(args = args.len(), method = %self.name, "adapt library method");
        invoke(&self.function, Some(&self.library), args)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
