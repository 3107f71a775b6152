use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use anyhow::{Error, Result};
use serde_json::Value;
use tracing::debug;
use super::channel::{oneshot, Deferred, Tx};

/// Error-first callback handed to a wrapped callable as its trailing
/// argument.
///
/// Clones share one settlement slot: the first call settles the deferred
/// value and every later call is ignored.
#[derive(Clone)]
pub struct Callback {
    slot: Arc<Slot>,
}

struct Slot {
    tx: Mutex<Option<Tx>>,
}

impl Callback {
    pub(crate) fn new(tx: Tx) -> Self {
        let tx = Mutex::new(Some(tx));
        Self { slot: Arc::new(Slot { tx }) }
    }

    /// A callback and the deferred value it settles, for calling a
    /// callable by hand.
    pub fn channel() -> (Self, Deferred) {
        let (tx, rx) = oneshot();
        (Self::new(tx), rx)
    }

    /// `callback(error, result)`: rejects when `error` is present,
    /// otherwise fulfils with `result`.
    pub fn call(&self, error: Option<Error>, result: Value) {
        match error {
            Some(e) => self.done(Err(e)),
            None    => self.done(Ok(result)),
        }
    }

    pub fn resolve(&self, value: Value) {
        self.done(Ok(value));
    }

    pub fn reject(&self, error: Error) {
        self.done(Err(error));
    }

    pub fn done(&self, result: Result<Value>) {
        match self.slot.take() {
            Some(tx) => tx.send(result),
            None     => debug!("callback already settled, ignoring {}", outcome(&result)),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.slot.tx.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl Slot {
    fn take(&self) -> Option<Tx> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        let tx = self.tx.get_mut().unwrap_or_else(PoisonError::into_inner);
        if tx.is_some() {
            debug!("callback dropped before settling");
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("settled", &self.is_settled()).finish()
    }
}

fn outcome(result: &Result<Value>) -> &'static str {
    match result {
        Ok(_)  => "result",
        Err(_) => "error",
    }
}
