//! Building the `connect` request that answers a gateway challenge.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use gateway_protocol::{
    AuthParams, ChallengePayload, ClientInfo, ConnectParams, DeviceAuthPayload, DeviceIdentity,
    EventFrame, ProtocolError, PROTOCOL_VERSION,
};

use crate::config::{read_gateway_token, ClientConfig, ClientSettings};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Extracts the nonce from a `connect.challenge` event.
pub fn challenge_nonce(frame: &EventFrame) -> Result<String, ProtocolError> {
    let payload = frame
        .payload
        .clone()
        .ok_or_else(|| ProtocolError::InvalidFrame("challenge without payload".to_string()))?;
    let challenge: ChallengePayload = serde_json::from_value(payload)
        .map_err(|e| ProtocolError::InvalidFrame(format!("bad challenge payload: {}", e)))?;
    if challenge.nonce.is_empty() {
        return Err(ProtocolError::InvalidFrame("challenge nonce is empty".to_string()));
    }
    Ok(challenge.nonce)
}

/// Picks the token to authenticate with.
///
/// An explicit token in `config` wins. Otherwise `gateway.auth.token` is
/// read from the gateway's own config file at `gateway_config`.
pub fn resolve_token(config: &ClientConfig, gateway_config: &Path) -> Option<String> {
    if let Some(token) = config.token() {
        return Some(token.to_string());
    }
    let token = read_gateway_token(gateway_config)?;
    tracing::debug!(path = %gateway_config.display(), "using token from gateway config");
    Some(token)
}

/// Builds the connect parameters for one handshake.
///
/// When `identity` is present the request carries a signed device block
/// binding the nonce, token and client descriptor.
pub fn connect_params(
    settings: &ClientSettings,
    token: Option<&str>,
    identity: Option<&DeviceIdentity>,
    nonce: &str,
    signed_at_ms: i64,
) -> ConnectParams {
    let device = identity.map(|identity| {
        DeviceAuthPayload {
            device_id: identity.device_id(),
            client_id: &settings.client_id,
            client_mode: &settings.mode,
            role: &settings.role,
            scopes: &settings.scopes,
            signed_at_ms,
            token: token.unwrap_or_default(),
            nonce,
        }
        .sign(identity)
    });

    ConnectParams {
        min_protocol: PROTOCOL_VERSION,
        max_protocol: PROTOCOL_VERSION,
        client: ClientInfo {
            id: settings.client_id.clone(),
            display_name: settings.display_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            mode: settings.mode.clone(),
        },
        role: settings.role.clone(),
        scopes: settings.scopes.clone(),
        caps: settings.caps.clone(),
        permissions: None,
        auth: token.map(|token| AuthParams {
            token: Some(token.to_string()),
            password: None,
        }),
        device,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_protocol::crypto::verify_base64url;
    use gateway_protocol::EVENT_CONNECT_CHALLENGE;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_challenge_nonce() {
        let frame = EventFrame::new(EVENT_CONNECT_CHALLENGE, Some(json!({"nonce": "abc", "ts": 1})));
        assert_eq!(challenge_nonce(&frame).unwrap(), "abc");

        let frame = EventFrame::new(EVENT_CONNECT_CHALLENGE, None);
        assert!(challenge_nonce(&frame).is_err());

        let frame = EventFrame::new(EVENT_CONNECT_CHALLENGE, Some(json!({"nonce": ""})));
        assert!(challenge_nonce(&frame).is_err());
    }

    #[test]
    fn test_connect_params_with_device_block() {
        let settings = ClientSettings::default();
        let identity = DeviceIdentity::generate();

        let params = connect_params(&settings, Some("tok"), Some(&identity), "abc", 1_700_000_000_000);
        assert_eq!(params.min_protocol, 3);
        assert_eq!(params.max_protocol, 3);
        assert_eq!(params.client.id, "gateway-client");
        assert_eq!(params.client.mode, "backend");
        assert_eq!(params.role, "operator");
        assert_eq!(params.auth.as_ref().and_then(|a| a.token.as_deref()), Some("tok"));

        let device = params.device.expect("device block");
        assert_eq!(device.id, identity.device_id());
        assert_eq!(device.nonce, "abc");
        assert_eq!(device.signed_at, 1_700_000_000_000);

        let expected = format!(
            "v2|{}|gateway-client|backend|operator|operator.read,operator.write,operator.admin|1700000000000|tok|abc",
            identity.device_id()
        );
        verify_base64url(&device.public_key, &expected, &device.signature).unwrap();
    }

    #[test]
    fn test_connect_params_token_only() {
        let settings = ClientSettings::default();
        let params = connect_params(&settings, None, None, "n", 0);
        assert!(params.auth.is_none());
        assert!(params.device.is_none());

        let value = serde_json::to_value(&params).unwrap();
        assert!(value.get("device").is_none());
        assert_eq!(value["client"]["displayName"], "Gateway Dashboard");
    }

    #[test]
    fn test_resolve_token_prefers_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gateway.json");
        std::fs::write(&path, r#"{"gateway":{"auth":{"token":"file-token"}}}"#).unwrap();

        let explicit = ClientConfig::default().with_token("explicit");
        assert_eq!(resolve_token(&explicit, &path).as_deref(), Some("explicit"));

        let bare = ClientConfig::default();
        assert_eq!(resolve_token(&bare, &path).as_deref(), Some("file-token"));

        let missing = temp_dir.path().join("missing.json");
        assert_eq!(resolve_token(&bare, &missing), None);
    }

    #[test]
    fn test_now_ms_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_ms() > 1_577_836_800_000);
    }
}
