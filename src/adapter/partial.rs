//! Partial application over [`adapt`] and [`method`].
//!
//! Every stage holds an argument prefix. Calling a stage appends the
//! remaining arguments to the prefix and adapts the call; binding a stage
//! appends to the prefix and returns the next stage. For methods the
//! receiver always comes first and the method name second, however the
//! arguments are split.

use std::sync::Arc;
use anyhow::Result;
use serde_json::Value;
use super::channel::Deferred;
use super::function::{adapt, Args, Function};
use super::object::{method, Object};

/// Nothing bound yet; the function is supplied with the call.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbound;

#[derive(Clone, Debug)]
pub struct Partial {
    function: Function,
    bound:    Vec<Value>,
}

/// Nothing bound yet; receiver and method name are supplied with the call.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnboundMethod;

/// Receiver bound; method name and arguments are supplied with the call.
#[derive(Clone, Debug)]
pub struct Receiver {
    target: Object,
}

#[derive(Clone, Debug)]
pub struct PartialMethod {
    target: Object,
    name:   Arc<str>,
    bound:  Vec<Value>,
}

pub fn part() -> Unbound {
    Unbound
}

pub fn part_method() -> UnboundMethod {
    UnboundMethod
}

pub fn partial<A: Args>(function: &Function, bound: A) -> Partial {
    Unbound.bind(function, bound)
}

pub fn partial_method<A: Args>(target: &Object, name: &str, bound: A) -> PartialMethod {
    UnboundMethod.bind(target).bind(name, bound)
}

impl Unbound {
    pub fn bind<A: Args>(&self, function: &Function, bound: A) -> Partial {
        Partial {
            function: function.clone(),
            bound:    bound.args(),
        }
    }

    pub fn call<A: Args>(&self, function: &Function, args: A) -> Deferred {
        adapt(function, args)
    }
}

impl Partial {
    pub fn bind<A: Args>(&self, more: A) -> Partial {
        Partial {
            function: self.function.clone(),
            bound:    concat(&self.bound, more),
        }
    }

    pub fn call<A: Args>(&self, rest: A) -> Deferred {
        adapt(&self.function, concat(&self.bound, rest))
    }

    pub fn bound(&self) -> &[Value] {
        &self.bound
    }
}

impl UnboundMethod {
    pub fn bind(&self, target: &Object) -> Receiver {
        Receiver { target: target.clone() }
    }

    pub fn call<A: Args>(&self, target: &Object, name: &str, args: A) -> Result<Deferred> {
        method(target, name, args)
    }
}

impl Receiver {
    pub fn bind<A: Args>(&self, name: &str, bound: A) -> PartialMethod {
        PartialMethod {
            target: self.target.clone(),
            name:   name.into(),
            bound:  bound.args(),
        }
    }

    pub fn call<A: Args>(&self, name: &str, args: A) -> Result<Deferred> {
        method(&self.target, name, args)
    }
}

impl PartialMethod {
    pub fn bind<A: Args>(&self, more: A) -> PartialMethod {
        PartialMethod {
            target: self.target.clone(),
            name:   self.name.clone(),
            bound:  concat(&self.bound, more),
        }
    }

    /// Resolves the method by name on every call, so a method replaced on
    /// the receiver after binding is picked up.
    pub fn call<A: Args>(&self, rest: A) -> Result<Deferred> {
        method(&self.target, &self.name, concat(&self.bound, rest))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn concat<A: Args>(bound: &[Value], rest: A) -> Vec<Value> {
    let mut args = bound.to_vec();
    args.extend(rest.args());
    args
}
