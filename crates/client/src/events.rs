//! Delivery of server-pushed events to the application.

use std::sync::Arc;

use gateway_protocol::EventFrame;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

/// An event pushed by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    pub payload: Value,
}

impl From<EventFrame> for GatewayEvent {
    fn from(frame: EventFrame) -> Self {
        Self {
            event: frame.event,
            seq: frame.seq,
            payload: frame.payload.unwrap_or(Value::Null),
        }
    }
}

/// Handler invoked for each event, in arrival order, on the read loop.
///
/// Handlers run inline with frame processing. Do not await a gateway
/// request from inside one; spawn a task instead.
pub type EventHandler = Arc<dyn Fn(GatewayEvent) + Send + Sync>;

/// Holds the single registered event handler.
#[derive(Default)]
pub struct EventDispatcher {
    handler: RwLock<Option<EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler`, replacing any previous one.
    pub fn set_handler(&self, handler: EventHandler) {
        *self.handler.write() = Some(handler);
    }

    /// Removes the handler; later events are dropped.
    pub fn clear_handler(&self) {
        *self.handler.write() = None;
    }

    /// Routes one event frame. Returns true if a handler received it.
    ///
    /// The challenge event belongs to the handshake and `tick` is a bare
    /// heartbeat; neither reaches the handler.
    pub fn dispatch(&self, frame: EventFrame) -> bool {
        if frame.is_challenge() || frame.is_tick() {
            return false;
        }
        // Clone out so the handler runs without the lock held.
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => {
                handler(frame.into());
                true
            }
            None => {
                tracing::trace!(event = %frame.event, "no event handler installed, dropping event");
                false
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("has_handler", &self.handler.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_protocol::{EVENT_CONNECT_CHALLENGE, EVENT_TICK};
    use parking_lot::Mutex;
    use serde_json::json;

    fn recording_dispatcher() -> (EventDispatcher, Arc<Mutex<Vec<GatewayEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = EventDispatcher::new();
        let sink = Arc::clone(&seen);
        dispatcher.set_handler(Arc::new(move |event| sink.lock().push(event)));
        (dispatcher, seen)
    }

    #[test]
    fn test_events_delivered_in_order() {
        let (dispatcher, seen) = recording_dispatcher();
        for i in 1..=5 {
            let frame = EventFrame::new(format!("e{}", i), Some(json!({"i": i}))).with_seq(i);
            assert!(dispatcher.dispatch(frame));
        }

        let names: Vec<String> = seen.lock().iter().map(|e| e.event.clone()).collect();
        assert_eq!(names, vec!["e1", "e2", "e3", "e4", "e5"]);
        assert_eq!(seen.lock()[2].seq, Some(3));
    }

    #[test]
    fn test_challenge_and_tick_filtered() {
        let (dispatcher, seen) = recording_dispatcher();
        assert!(!dispatcher.dispatch(EventFrame::new(EVENT_TICK, None)));
        assert!(!dispatcher.dispatch(EventFrame::new(
            EVENT_CONNECT_CHALLENGE,
            Some(json!({"nonce": "n"}))
        )));
        assert!(dispatcher.dispatch(EventFrame::new("chat", None)));

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].payload, Value::Null);
    }

    #[test]
    fn test_without_handler_events_are_dropped() {
        let dispatcher = EventDispatcher::new();
        assert!(!dispatcher.dispatch(EventFrame::new("agent", None)));
    }

    #[test]
    fn test_replace_and_clear_handler() {
        let (dispatcher, first) = recording_dispatcher();
        let second = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&second);
        dispatcher.set_handler(Arc::new(move |event| sink.lock().push(event)));

        dispatcher.dispatch(EventFrame::new("presence", None));
        assert!(first.lock().is_empty());
        assert_eq!(second.lock().len(), 1);

        dispatcher.clear_handler();
        assert!(!dispatcher.dispatch(EventFrame::new("presence", None)));
    }
}
