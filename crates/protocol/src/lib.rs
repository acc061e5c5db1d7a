//! # Gateway Protocol Library
//!
//! This crate provides the wire-level definitions shared by everything that
//! talks to the agent gateway.
//!
//! ## Overview
//!
//! - **Frames**: request, response and event shapes, plus the classifier the
//!   read loop uses to route inbound text messages
//! - **Connect**: parameters of the `connect` authentication request and the
//!   device signing payload
//! - **Crypto**: Ed25519 device identity, device id derivation, base64url
//!
//! ## Example Usage
//!
//! ```rust
//! use gateway_protocol::{DeviceIdentity, InboundFrame, RequestFrame};
//! use serde_json::json;
//!
//! let identity = DeviceIdentity::generate();
//! println!("Device ID: {}", identity.device_id());
//!
//! let frame = RequestFrame::new("1", "sessions.list", json!({}));
//! let text = frame.to_json().unwrap();
//! assert!(text.contains("sessions.list"));
//!
//! let inbound = InboundFrame::decode(r#"{"id":"1","ok":true,"payload":[]}"#).unwrap();
//! assert!(matches!(inbound, InboundFrame::Response(_)));
//! ```
//!
//! ## Modules
//!
//! - [`frames`]: Wire frames and classification
//! - [`connect`]: Connect request parameters and signing payload
//! - [`crypto`]: Device identity and signatures
//! - [`error`]: Error types

pub mod connect;
pub mod crypto;
pub mod error;
pub mod frames;

pub use connect::{
    AuthParams, ChallengePayload, ClientInfo, ConnectParams, DeviceAuth, DeviceAuthPayload,
    PROTOCOL_VERSION,
};
pub use crypto::DeviceIdentity;
pub use error::{ProtocolError, Result};
pub use frames::{
    ErrorCode, ErrorShape, EventFrame, InboundFrame, RequestFrame, ResponseFrame,
    EVENT_CONNECT_CHALLENGE, EVENT_TICK, METHOD_CONNECT,
};
