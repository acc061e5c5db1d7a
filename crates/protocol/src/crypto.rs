//! Device identity used to sign gateway connect requests.
//!
//! This module provides Ed25519 key generation, the device identifier
//! derivation the gateway expects, and signing with base64url encoding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::{ProtocolError, Result};

/// Derives the gateway device identifier from raw public key bytes.
///
/// The identifier is the lowercase hex SHA-256 digest of the 32-byte key.
pub fn derive_device_id(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> String {
    hex::encode(Sha256::digest(public_key))
}

/// Encodes bytes as unpadded URL-safe base64.
pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes unpadded URL-safe base64.
pub fn base64url_decode(input: &str) -> Result<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(input.as_bytes())?)
}

/// The identity of the local device, including the secret key.
///
/// Keep this value private: it is used to prove to the gateway that
/// connect requests originate from this device.
#[derive(Clone)]
pub struct DeviceIdentity {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    device_id: String,
}

impl DeviceIdentity {
    /// Generates a new random device identity.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Creates a DeviceIdentity from raw secret key bytes.
    ///
    /// The public key and device ID are derived from the secret key.
    pub fn from_secret_key_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    /// Creates a DeviceIdentity from a base64url-encoded secret key.
    pub fn from_secret_key_base64url(encoded: &str) -> Result<Self> {
        let raw = base64url_decode(encoded)?;
        let bytes: [u8; SECRET_KEY_LENGTH] = raw.as_slice().try_into().map_err(|_| {
            ProtocolError::Identity(format!(
                "secret key must be {} bytes, got {}",
                SECRET_KEY_LENGTH,
                raw.len()
            ))
        })?;
        Ok(Self::from_secret_key_bytes(&bytes))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        let device_id = derive_device_id(verifying_key.as_bytes());
        Self {
            signing_key,
            verifying_key,
            device_id,
        }
    }

    /// Returns the secret key bytes.
    ///
    /// **Security Warning**: only use this for persisting the identity.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Returns the public key bytes.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// Returns the public key as unpadded base64url, the form sent in
    /// connect requests.
    pub fn public_key_base64url(&self) -> String {
        base64url_encode(self.verifying_key.as_bytes())
    }

    /// Returns the device ID.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Signs a payload and returns the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Signs a text payload and returns the signature as base64url.
    pub fn sign_base64url(&self, payload: &str) -> String {
        base64url_encode(&self.sign(payload.as_bytes()))
    }

    /// Verifies a base64url signature over `payload` with this device's key.
    pub fn verify_base64url(&self, payload: &str, signature: &str) -> Result<()> {
        verify_base64url(&self.public_key_base64url(), payload, signature)
    }
}

impl std::fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("device_id", &self.device_id)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Verifies a base64url signature against a base64url public key.
pub fn verify_base64url(public_key: &str, payload: &str, signature: &str) -> Result<()> {
    let key_raw = base64url_decode(public_key)?;
    let key_bytes: [u8; PUBLIC_KEY_LENGTH] = key_raw
        .as_slice()
        .try_into()
        .map_err(|_| ProtocolError::InvalidPublicKey(format!("length {}", key_raw.len())))?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| ProtocolError::InvalidPublicKey(e.to_string()))?;

    let sig_raw = base64url_decode(signature)?;
    let sig_bytes: [u8; SIGNATURE_LENGTH] = sig_raw
        .as_slice()
        .try_into()
        .map_err(|_| ProtocolError::InvalidSignature(format!("length {}", sig_raw.len())))?;

    verifying_key
        .verify(payload.as_bytes(), &Signature::from_bytes(&sig_bytes))
        .map_err(ProtocolError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation_produces_unique_keys() {
        let identity1 = DeviceIdentity::generate();
        let identity2 = DeviceIdentity::generate();

        assert_ne!(identity1.secret_key_bytes(), identity2.secret_key_bytes());
        assert_ne!(identity1.device_id(), identity2.device_id());
    }

    #[test]
    fn test_device_id_is_hex_sha256_of_public_key() {
        let identity = DeviceIdentity::generate();
        let id = identity.device_id();

        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(id, derive_device_id(&identity.public_key_bytes()));
    }

    #[test]
    fn test_restore_from_secret_key() {
        let original = DeviceIdentity::generate();
        let encoded = base64url_encode(&original.secret_key_bytes());

        let restored = DeviceIdentity::from_secret_key_base64url(&encoded).unwrap();
        assert_eq!(original.public_key_bytes(), restored.public_key_bytes());
        assert_eq!(original.device_id(), restored.device_id());
    }

    #[test]
    fn test_restore_rejects_wrong_length() {
        let encoded = base64url_encode(&[1u8; 16]);
        let err = DeviceIdentity::from_secret_key_base64url(&encoded).unwrap_err();
        assert!(matches!(err, ProtocolError::Identity(_)));
    }

    #[test]
    fn test_public_key_is_unpadded_base64url() {
        let identity = DeviceIdentity::generate();
        let encoded = identity.public_key_base64url();

        assert_eq!(encoded.len(), 43);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(base64url_decode(&encoded).unwrap(), identity.public_key_bytes());
    }

    #[test]
    fn test_sign_and_verify() {
        let identity = DeviceIdentity::generate();
        let payload = "v2|dev|cli|backend|operator||1700000000000||abc";
        let sig = identity.sign_base64url(payload);

        assert!(identity.verify_base64url(payload, &sig).is_ok());
        assert!(identity.verify_base64url("tampered", &sig).is_err());

        let other = DeviceIdentity::generate();
        assert!(other.verify_base64url(payload, &sig).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let identity = DeviceIdentity::generate();
        let debug = format!("{:?}", identity);
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains(identity.device_id()));
    }
}
