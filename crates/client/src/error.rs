//! Error types returned by the gateway client.

use std::time::Duration;

use gateway_protocol::{ErrorCode, ProtocolError};
use thiserror::Error;

/// Errors surfaced to callers of the gateway client.
///
/// Transport failures (dial, read, authentication) are handled inside the
/// connection manager and only reach request callers as
/// [`ClientError::ConnectionClosed`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// No authenticated connection is available.
    #[error("not connected to gateway")]
    NotConnected,

    /// The request frame could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// The request frame could not be handed to the socket writer.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// No terminal response arrived within the deadline.
    #[error("request {method} timed out after {timeout:?}")]
    RequestTimeout { method: String, timeout: Duration },

    /// The connection died while the request was waiting.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The client was stopped while the request was waiting.
    #[error("client stopped")]
    ClientStopped,

    /// The gateway answered with `ok: false`.
    #[error("gateway error {code}: {message}")]
    GatewayError { code: ErrorCode, message: String },

    /// The connect handshake was rejected or timed out.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The transport-level connect failed.
    #[error("dial failed: {0}")]
    DialFailed(String),

    /// A request id collided with one that is still pending.
    #[error("request id already pending: {0}")]
    DuplicateRequestId(String),

    /// The device identity could not be loaded or created.
    #[error("device identity unavailable: {0}")]
    Identity(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Serialization(msg) => ClientError::SerializationFailed(msg),
            ProtocolError::Identity(msg)
            | ProtocolError::InvalidPublicKey(msg)
            | ProtocolError::InvalidSignature(msg) => ClientError::Identity(msg),
            other => ClientError::SerializationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = ClientError::GatewayError {
            code: ErrorCode::Numeric(500),
            message: "agent crashed".to_string(),
        };
        assert_eq!(err.to_string(), "gateway error 500: agent crashed");

        let err = ClientError::GatewayError {
            code: ErrorCode::Named("UNAVAILABLE".to_string()),
            message: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "gateway error UNAVAILABLE: busy");
    }

    #[test]
    fn test_timeout_display() {
        let err = ClientError::RequestTimeout {
            method: "sessions.list".to_string(),
            timeout: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "request sessions.list timed out after 200ms");
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ClientError = ProtocolError::Serialization("bad".to_string()).into();
        assert!(matches!(err, ClientError::SerializationFailed(_)));

        let err: ClientError = ProtocolError::Identity("corrupt".to_string()).into();
        assert!(matches!(err, ClientError::Identity(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
