//! Wire frames exchanged with the gateway.
//!
//! # Frame Shapes
//!
//! Every frame is one JSON object sent as a WebSocket text message:
//!
//! - Request: `{"type":"req","id":..,"method":..,"params":{..}}`
//! - Response: `{"id":..,"ok":true|false,"payload"?:..,"error"?:{"code":..,"message":..}}`
//! - Event: `{"event":..,"seq"?:..,"payload"?:..}`
//!
//! Inbound frames are classified by peeking at the top-level keys rather
//! than trying each struct in turn: an `event` key marks an event, otherwise
//! an `id` key marks a response. Anything else is surfaced as
//! [`InboundFrame::Unknown`] so the caller can log and drop it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, Result};

/// Event emitted by the gateway right after the socket opens.
pub const EVENT_CONNECT_CHALLENGE: &str = "connect.challenge";

/// Liveness heartbeat event pushed by the gateway.
pub const EVENT_TICK: &str = "tick";

/// Method name of the authentication request.
pub const METHOD_CONNECT: &str = "connect";

/// Payload status marking an intermediate acknowledgement.
pub const STATUS_ACCEPTED: &str = "accepted";

const REQUEST_FRAME_TYPE: &str = "req";

/// Outbound request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub id: String,
    pub method: String,
    pub params: Value,
}

impl RequestFrame {
    /// Creates a request frame for `method`.
    ///
    /// A `null` params value is sent as an empty object since the gateway
    /// expects `params` to be an object.
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        let params = if params.is_null() {
            Value::Object(Default::default())
        } else {
            params
        };
        Self {
            frame_type: REQUEST_FRAME_TYPE.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Serializes the frame to its wire text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }
}

/// Error code reported by the gateway.
///
/// Gateways report either numeric codes or symbolic ones such as
/// `"INVALID_REQUEST"`; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Numeric(i64),
    Named(String),
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Numeric(0)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Numeric(code) => write!(f, "{}", code),
            ErrorCode::Named(code) => f.write_str(code),
        }
    }
}

/// Error body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorShape {
    #[serde(default)]
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

/// Response to a previously sent request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id: String,
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl ResponseFrame {
    /// Builds a successful response.
    pub fn success(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    /// Builds a failed response.
    pub fn failure(id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(ErrorShape {
                code,
                message: message.into(),
            }),
        }
    }

    /// Returns true if this is an intermediate `{"status":"accepted"}`
    /// acknowledgement rather than the terminal response.
    ///
    /// Only a payload with exactly that one key matches; any extra field
    /// makes it a terminal response.
    pub fn is_accepted_ack(&self) -> bool {
        if !self.ok {
            return false;
        }
        match &self.payload {
            Some(Value::Object(map)) => {
                map.len() == 1
                    && map.get("status").and_then(Value::as_str) == Some(STATUS_ACCEPTED)
            }
            _ => false,
        }
    }

    /// Serializes the frame to its wire text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }
}

/// Server-pushed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl EventFrame {
    /// Creates an event frame without a sequence number.
    pub fn new(event: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            event: event.into(),
            seq: None,
            payload,
        }
    }

    /// Sets the sequence number.
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }

    /// Returns true for the authentication challenge event.
    pub fn is_challenge(&self) -> bool {
        self.event == EVENT_CONNECT_CHALLENGE
    }

    /// Returns true for the gateway heartbeat event.
    pub fn is_tick(&self) -> bool {
        self.event == EVENT_TICK
    }

    /// Serializes the frame to its wire text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Event(EventFrame),
    Response(ResponseFrame),
    /// A JSON object carrying neither `event` nor `id`.
    Unknown(Value),
}

impl InboundFrame {
    /// Decodes and classifies one wire text message.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Some(map) = value.as_object() else {
            return Err(ProtocolError::InvalidFrame(
                "top-level value is not an object".to_string(),
            ));
        };

        if map.contains_key("event") {
            let frame = serde_json::from_value(value)
                .map_err(|e| ProtocolError::InvalidFrame(format!("event frame: {}", e)))?;
            Ok(InboundFrame::Event(frame))
        } else if map.contains_key("id") {
            let frame = serde_json::from_value(value)
                .map_err(|e| ProtocolError::InvalidFrame(format!("response frame: {}", e)))?;
            Ok(InboundFrame::Response(frame))
        } else {
            Ok(InboundFrame::Unknown(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_frame_serialization() {
        let frame = RequestFrame::new("req-1", "sessions.list", json!({"limit": 10}));
        let json = frame.to_json().unwrap();
        assert!(json.contains("\"type\":\"req\""));
        assert!(json.contains("\"id\":\"req-1\""));
        assert!(json.contains("\"method\":\"sessions.list\""));
        assert!(json.contains("\"params\":{\"limit\":10}"));
    }

    #[test]
    fn test_request_frame_null_params_become_object() {
        let frame = RequestFrame::new("req-2", "health", Value::Null);
        assert_eq!(frame.params, json!({}));
    }

    #[test]
    fn test_decode_event_frame() {
        let text = r#"{"type":"event","event":"agent","seq":7,"payload":{"runId":"r1"}}"#;
        match InboundFrame::decode(text).unwrap() {
            InboundFrame::Event(ev) => {
                assert_eq!(ev.event, "agent");
                assert_eq!(ev.seq, Some(7));
                assert_eq!(ev.payload, Some(json!({"runId": "r1"})));
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_decode_response_with_numeric_error() {
        let text = r#"{"id":"abc","ok":false,"error":{"code":404,"message":"no such session"}}"#;
        match InboundFrame::decode(text).unwrap() {
            InboundFrame::Response(res) => {
                assert!(!res.ok);
                let err = res.error.unwrap();
                assert_eq!(err.code, ErrorCode::Numeric(404));
                assert_eq!(err.message, "no such session");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_decode_response_with_named_error() {
        let text = r#"{"type":"res","id":"abc","ok":false,"error":{"code":"INVALID_REQUEST","message":"bad"}}"#;
        match InboundFrame::decode(text).unwrap() {
            InboundFrame::Response(res) => {
                let err = res.error.unwrap();
                assert_eq!(err.code, ErrorCode::Named("INVALID_REQUEST".to_string()));
                assert_eq!(err.code.to_string(), "INVALID_REQUEST");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_event_key_takes_precedence_over_id() {
        let text = r#"{"event":"presence","id":"x"}"#;
        assert!(matches!(
            InboundFrame::decode(text).unwrap(),
            InboundFrame::Event(_)
        ));
    }

    #[test]
    fn test_decode_unknown_and_invalid() {
        assert!(matches!(
            InboundFrame::decode(r#"{"hello":"world"}"#).unwrap(),
            InboundFrame::Unknown(_)
        ));
        assert!(matches!(
            InboundFrame::decode("[1,2,3]"),
            Err(ProtocolError::InvalidFrame(_))
        ));
        assert!(matches!(
            InboundFrame::decode("{not json"),
            Err(ProtocolError::Deserialization(_))
        ));
        assert!(matches!(
            InboundFrame::decode(r#"{"event":42}"#),
            Err(ProtocolError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_accepted_ack_detection() {
        let ack = ResponseFrame::success("a", json!({"status": "accepted"}));
        assert!(ack.is_accepted_ack());

        let terminal = ResponseFrame::success("a", json!({"status": "accepted", "runId": "r"}));
        assert!(!terminal.is_accepted_ack());

        let done = ResponseFrame::success("a", json!({"status": "ok"}));
        assert!(!done.is_accepted_ack());

        let failed = ResponseFrame {
            id: "a".to_string(),
            ok: false,
            payload: Some(json!({"status": "accepted"})),
            error: None,
        };
        assert!(!failed.is_accepted_ack());

        let empty = ResponseFrame {
            id: "a".to_string(),
            ok: true,
            payload: None,
            error: None,
        };
        assert!(!empty.is_accepted_ack());
    }

    #[test]
    fn test_challenge_and_tick_predicates() {
        assert!(EventFrame::new(EVENT_CONNECT_CHALLENGE, None).is_challenge());
        assert!(EventFrame::new(EVENT_TICK, None).is_tick());
        assert!(!EventFrame::new("chat", None).is_tick());
    }
}
