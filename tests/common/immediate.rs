use std::sync::{Arc, Mutex};
use anyhow::anyhow;
use serde_json::Value;
use tokio::runtime::Handle;
use promify::{Callback, Function, Object};

pub type Seen = Arc<Mutex<Vec<Option<Object>>>>;

/// Callback-style test functions that settle on a later runtime tick.
#[derive(Clone)]
pub struct Immediate {
    handle: Handle,
}

impl Immediate {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn say(&self) -> Function {
        self.settle(|_, args| Ok(args.into_iter().next().unwrap_or_default()))
    }

    pub fn arrayify(&self) -> Function {
        self.settle(|_, args| Ok(Value::Array(args)))
    }

    pub fn fail(&self) -> Function {
        self.settle(|_, _| Err(anyhow!("oops")))
    }

    pub fn get_self(&self, seen: Seen) -> Function {
        self.settle(move |this, _| {
            seen.lock().unwrap().push(this.cloned());
            Ok(Value::Bool(this.is_some()))
        })
    }

    pub fn library(&self, seen: Seen) -> Object {
        Object::new()
            .with("say", self.say())
            .with("arrayify", self.arrayify())
            .with("fail", self.fail())
            .with("getSelf", self.get_self(seen))
            .with("name", "fake")
    }

    fn settle<F>(&self, f: F) -> Function
    where
        F: Fn(Option<&Object>, Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Function::new(move |this, args, cb: Callback| {
            let result = f(this, args);
            handle.spawn(async move {
                tokio::task::yield_now().await;
                match result {
                    Ok(value) => cb.call(None, value),
                    Err(e)    => cb.call(Some(e), Value::Null),
                }
            });
        })
    }
}
