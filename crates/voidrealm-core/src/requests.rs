//! Request source trait and a scripted implementation.
//!
//! The input layer decides when an actor casts, breaks, or asks whether it
//! may cast. The runner polls a [`RequestSource`] once per tick and routes
//! whatever it returns to the [`InstanceRegistry`](crate::registry::InstanceRegistry).
//!
//! [`ScriptedRequests`] replays a fixed tick-indexed script, which is enough
//! for tests and the demo engine.

use std::collections::BTreeMap;

use voidrealm_types::EntityId;

/// A request from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Start a region for the actor.
    Cast(EntityId),
    /// Tear down the actor's active region.
    Break(EntityId),
    /// Ask whether the actor may cast.
    CheckCooldown(EntityId),
}

impl Request {
    /// The actor the request is about.
    pub const fn actor(self) -> EntityId {
        match self {
            Self::Cast(actor) | Self::Break(actor) | Self::CheckCooldown(actor) => actor,
        }
    }
}

/// A source of cast, break, and cooldown requests.
pub trait RequestSource: Send {
    /// Requests to process before the registry tick numbered `tick`.
    fn poll(&mut self, tick: u64) -> Vec<Request>;

    /// Whether the source will never produce another request.
    fn is_exhausted(&self) -> bool;
}

/// A request source that never asks for anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRequests;

impl RequestSource for NoRequests {
    fn poll(&mut self, _tick: u64) -> Vec<Request> {
        Vec::new()
    }

    fn is_exhausted(&self) -> bool {
        true
    }
}

/// Replays a fixed script of requests keyed by tick number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedRequests {
    script: BTreeMap<u64, Vec<Request>>,
}

impl ScriptedRequests {
    /// Create an empty script.
    pub const fn new() -> Self {
        Self {
            script: BTreeMap::new(),
        }
    }

    /// Schedule `request` for tick `tick`. Requests on the same tick are
    /// delivered in insertion order.
    #[must_use]
    pub fn at(mut self, tick: u64, request: Request) -> Self {
        self.push(tick, request);
        self
    }

    /// Schedule `request` for tick `tick`.
    pub fn push(&mut self, tick: u64, request: Request) {
        self.script.entry(tick).or_default().push(request);
    }

    /// Number of requests not yet delivered.
    pub fn pending(&self) -> usize {
        self.script.values().map(Vec::len).sum()
    }
}

impl RequestSource for ScriptedRequests {
    fn poll(&mut self, tick: u64) -> Vec<Request> {
        // Anything scheduled for a tick that was skipped is delivered late
        // rather than dropped.
        let due: Vec<u64> = self.script.range(..=tick).map(|(t, _)| *t).collect();
        let mut out = Vec::new();
        for t in due {
            if let Some(mut requests) = self.script.remove(&t) {
                out.append(&mut requests);
            }
        }
        out
    }

    fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}
