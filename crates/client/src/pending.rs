//! Table of requests awaiting their terminal response.
//!
//! Each entry is a single-use oneshot slot keyed by request id. An entry is
//! resolved at most once and removed at the moment it is resolved, so a
//! late or duplicate response for the same id finds nothing and is dropped.

use std::collections::HashMap;

use gateway_protocol::ResponseFrame;
use tokio::sync::oneshot;

use crate::error::{ClientError, Result};

/// Outcome delivered to a parked request.
#[derive(Debug)]
pub enum Completion {
    /// The terminal response for the request.
    Response(ResponseFrame),
    /// The connection carrying the request went away.
    Closed(String),
    /// The client was stopped.
    Stopped,
}

/// What happened to an inbound response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The waiter was resolved and removed.
    Resolved,
    /// An intermediate `accepted` ack; the waiter stays parked.
    Acknowledged,
    /// No request with that id is pending.
    Unknown,
}

/// Pending request slots indexed by id.
#[derive(Debug, Default)]
pub struct PendingRequests {
    slots: HashMap<String, oneshot::Sender<Completion>>,
}

impl PendingRequests {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a new slot for `id` and returns the receiving half.
    ///
    /// Fails if `id` is already pending.
    pub fn register(&mut self, id: &str) -> Result<oneshot::Receiver<Completion>> {
        if self.slots.contains_key(id) {
            return Err(ClientError::DuplicateRequestId(id.to_string()));
        }
        let (tx, rx) = oneshot::channel();
        self.slots.insert(id.to_string(), tx);
        Ok(rx)
    }

    /// Routes a response frame to its waiter.
    pub fn deliver(&mut self, frame: ResponseFrame) -> Delivery {
        if !self.slots.contains_key(&frame.id) {
            return Delivery::Unknown;
        }
        if frame.is_accepted_ack() {
            return Delivery::Acknowledged;
        }
        if let Some(tx) = self.slots.remove(&frame.id) {
            // The caller may have given up already; nothing to do then.
            let _ = tx.send(Completion::Response(frame));
        }
        Delivery::Resolved
    }

    /// Removes a slot without resolving it. Returns true if it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.slots.remove(id).is_some()
    }

    /// Resolves every slot with `Completion::Closed` and empties the table.
    pub fn close_all(&mut self, reason: &str) -> usize {
        self.drain_with(|| Completion::Closed(reason.to_string()))
    }

    /// Resolves every slot with `Completion::Stopped` and empties the table.
    pub fn stop_all(&mut self) -> usize {
        self.drain_with(|| Completion::Stopped)
    }

    fn drain_with(&mut self, make: impl Fn() -> Completion) -> usize {
        let count = self.slots.len();
        for (_, tx) in self.slots.drain() {
            let _ = tx.send(make());
        }
        count
    }

    /// Returns true if `id` is pending.
    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
