#[cfg(not(feature = "tokio"))]
use crossbeam_channel::{bounded, Sender, Receiver};
#[cfg(feature = "tokio")]
use std::{future::Future, pin::Pin, task::{Context, Poll}};
use anyhow::{anyhow, Result};
use serde_json::Value;
#[cfg(feature = "tokio")]
use tokio::sync::oneshot::{channel, Sender, Receiver};

pub struct Tx(Sender<Result<Value>>);

/// The pending result of an adapted call.
///
/// Settles once, with the value or error handed to the callback. If the
/// callback is dropped without being called the result is an error.
#[must_use = "a deferred value does nothing unless received or awaited"]
pub struct Deferred(Receiver<Result<Value>>);

pub fn oneshot() -> (Tx, Deferred) {
    #[cfg(feature = "tokio")]
    let (tx, rx) = channel();
    #[cfg(not(feature = "tokio"))]
    let (tx, rx) = bounded(1);
    (Tx(tx), Deferred(rx))
}

impl Tx {
    pub fn send(self, result: Result<Value>) {
        match self.0.send(result) {
            Ok(()) => (),
            Err(_) => (),
        }
    }
}

#[cfg(not(feature = "tokio"))]
impl Deferred {
    pub fn recv(self) -> Result<Value> {
        match self.0.recv() {
            Ok(result) => result,
            Err(_)     => Err(dropped()),
        }
    }

    pub fn try_recv(&mut self) -> Option<Result<Value>> {
        use crossbeam_channel::TryRecvError;
        match self.0.try_recv() {
            Ok(result)                      => Some(result),
            Err(TryRecvError::Empty)        => None,
            Err(TryRecvError::Disconnected) => Some(Err(dropped())),
        }
    }
}

#[cfg(feature = "tokio")]
impl Deferred {
    /// Blocks the current thread until the call settles. Must not be
    /// called from within an async runtime.
    pub fn recv(self) -> Result<Value> {
        match self.0.blocking_recv() {
            Ok(result) => result,
            Err(_)     => Err(dropped()),
        }
    }

    pub fn try_recv(&mut self) -> Option<Result<Value>> {
        use tokio::sync::oneshot::error::TryRecvError;
        match self.0.try_recv() {
            Ok(result)                 => Some(result),
            Err(TryRecvError::Empty)   => None,
            Err(TryRecvError::Closed)  => Some(Err(dropped())),
        }
    }
}

#[cfg(feature = "tokio")]
impl Future for Deferred {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.0).poll(cx) {
            Poll::Ready(Ok(r))  => Poll::Ready(r),
            Poll::Ready(Err(_)) => Poll::Ready(Err(dropped())),
            Poll::Pending       => Poll::Pending,
        }
    }
}

fn dropped() -> anyhow::Error {
    anyhow!("callback dropped before settling")
}
