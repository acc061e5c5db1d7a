//! Parameters of the `connect` authentication request.
//!
//! After the socket opens the gateway pushes a `connect.challenge` event with
//! a nonce. The client answers with a `connect` request whose `device` block
//! carries an Ed25519 signature over a pipe-delimited payload binding the
//! device, client descriptor, role, scopes, timestamp, token and nonce.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::crypto::DeviceIdentity;

/// Gateway protocol version spoken by this client.
pub const PROTOCOL_VERSION: u32 = 3;

/// Version tag of nonce-bound signing payloads.
pub const SIGNATURE_VERSION: &str = "v2";

/// Payload of the `connect.challenge` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengePayload {
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

/// Client descriptor sent in the connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: String,
    pub display_name: String,
    pub version: String,
    pub platform: String,
    pub mode: String,
}

/// Shared-secret authentication block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Signed device block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuth {
    pub id: String,
    pub public_key: String,
    pub signature: String,
    pub signed_at: i64,
    pub nonce: String,
}

/// Full parameter object of the `connect` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    pub min_protocol: u32,
    pub max_protocol: u32,
    pub client: ClientInfo,
    pub role: String,
    pub scopes: Vec<String>,
    pub caps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<HashMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceAuth>,
}

/// Fields bound together by the device signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAuthPayload<'a> {
    pub device_id: &'a str,
    pub client_id: &'a str,
    pub client_mode: &'a str,
    pub role: &'a str,
    pub scopes: &'a [String],
    pub signed_at_ms: i64,
    pub token: &'a str,
    pub nonce: &'a str,
}

impl DeviceAuthPayload<'_> {
    /// Renders the pipe-delimited string that gets signed.
    ///
    /// `v2|deviceId|clientId|clientMode|role|scopes|signedAtMs|token|nonce`,
    /// where scopes are comma-joined and an absent token is empty.
    pub fn to_signing_string(&self) -> String {
        let signed_at = self.signed_at_ms.to_string();
        let scopes = self.scopes.join(",");
        [
            SIGNATURE_VERSION,
            self.device_id,
            self.client_id,
            self.client_mode,
            self.role,
            scopes.as_str(),
            signed_at.as_str(),
            self.token,
            self.nonce,
        ]
        .join("|")
    }

    /// Signs the payload with `identity` and builds the device block.
    pub fn sign(&self, identity: &DeviceIdentity) -> DeviceAuth {
        DeviceAuth {
            id: identity.device_id().to_string(),
            public_key: identity.public_key_base64url(),
            signature: identity.sign_base64url(&self.to_signing_string()),
            signed_at: self.signed_at_ms,
            nonce: self.nonce.to_string(),
        }
    }
}
