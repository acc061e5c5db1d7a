//! Error types for the protocol crate.

use thiserror::Error;

/// Protocol error type covering frame codec and identity failures.
#[derive(Debug, Error)]
pub enum ProtocolError {
    // Serialization errors
    /// Failed to serialize data.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Failed to deserialize data.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Text parsed as JSON but is not a usable frame.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    // Cryptographic errors
    /// Signature verification failed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Invalid or malformed public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Device identity material could not be decoded.
    #[error("invalid device identity: {0}")]
    Identity(String),
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

// Conversions from underlying crate errors

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_eof() || err.is_syntax() {
            ProtocolError::Deserialization(err.to_string())
        } else {
            ProtocolError::Serialization(err.to_string())
        }
    }
}

impl From<ed25519_dalek::SignatureError> for ProtocolError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        ProtocolError::InvalidSignature(err.to_string())
    }
}

impl From<base64::DecodeError> for ProtocolError {
    fn from(err: base64::DecodeError) -> Self {
        ProtocolError::Identity(format!("base64 decode: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_frame_error_display() {
        let err = ProtocolError::InvalidFrame("top-level value is not an object".to_string());
        assert_eq!(
            err.to_string(),
            "invalid frame: top-level value is not an object"
        );
    }

    #[test]
    fn test_invalid_public_key_error_display() {
        let err = ProtocolError::InvalidPublicKey("wrong key length".to_string());
        assert_eq!(err.to_string(), "invalid public key: wrong key length");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let protocol_err: ProtocolError = json_err.into();
        assert!(matches!(protocol_err, ProtocolError::Deserialization(_)));
    }

    #[test]
    fn test_from_base64_error() {
        use base64::Engine as _;
        let err = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode("***")
            .unwrap_err();
        let protocol_err: ProtocolError = err.into();
        assert!(matches!(protocol_err, ProtocolError::Identity(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProtocolError>();
    }
}
