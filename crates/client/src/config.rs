//! Configuration management for the gateway client.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/gatewayctl/config.toml`.
//!
//! Two runtime views are derived from the file:
//! - [`ClientConfig`]: where to connect and with which token. Swappable at
//!   runtime through `GatewayClient::reconnect`.
//! - [`ClientSettings`]: client descriptor, timeouts, backoff and health
//!   tuning, fixed for the life of a client.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default gateway host.
pub const DEFAULT_GATEWAY_HOST: &str = "127.0.0.1";

/// Default gateway port.
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;

/// Environment variable pointing at the gateway's own config file.
pub const GATEWAY_CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG_PATH";

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("gateway host must not be empty")]
    EmptyHost,

    #[error("gateway port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    #[error("{name} must be greater than 0")]
    ZeroDuration { name: &'static str },

    #[error("initial_backoff_ms ({initial}) must not exceed max_backoff_ms ({max})")]
    InvalidBackoff { initial: u64, max: u64 },

    #[error("max_fails must be at least 1, got {0}")]
    InvalidMaxFails(u32),

    #[error("client {0} must not be empty")]
    EmptyClientField(&'static str),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the gateway client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,

    /// Gateway address and credentials.
    pub gateway: GatewayConfig,

    /// How this client describes itself in the connect handshake.
    pub client: ClientDescriptorConfig,

    /// Request and handshake deadlines.
    pub timeouts: TimeoutConfig,

    /// Reconnect backoff bounds.
    pub reconnect: ReconnectConfig,

    /// Health monitor settings.
    pub health: HealthConfig,

    /// External restart action invoked by the health monitor.
    pub restart: RestartConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the device identity file.
    pub data_dir: PathBuf,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Gateway address and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token. When unset the token is read from the gateway's own
    /// config file during the handshake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Client descriptor sent in the connect request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientDescriptorConfig {
    pub id: String,
    pub display_name: String,
    pub mode: String,
    pub role: String,
    pub scopes: Vec<String>,
    pub caps: Vec<String>,
}

/// Request and handshake deadlines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default deadline for `request` in milliseconds.
    pub request_ms: u64,
    /// Deadline for the challenge and the connect response in milliseconds.
    pub auth_ms: u64,
}

/// Reconnect backoff bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// Health monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// Start the probe loop together with the client.
    pub enabled: bool,
    /// Seconds between probes.
    pub interval_secs: u64,
    /// Consecutive failed probes before a restart is triggered.
    pub max_fails: u32,
    /// Deadline of a single ping or dial probe in milliseconds.
    pub probe_timeout_ms: u64,
}

/// External restart action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RestartConfig {
    /// Program and arguments run to restart the gateway.
    pub command: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GATEWAY_HOST.to_string(),
            port: DEFAULT_GATEWAY_PORT,
            token: None,
        }
    }
}

impl Default for ClientDescriptorConfig {
    fn default() -> Self {
        Self {
            id: "gateway-client".to_string(),
            display_name: "Gateway Dashboard".to_string(),
            mode: "backend".to_string(),
            role: "operator".to_string(),
            scopes: vec![
                "operator.read".to_string(),
                "operator.write".to_string(),
                "operator.admin".to_string(),
            ],
            caps: Vec::new(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_ms: 15_000,
            auth_ms: 10_000,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 30,
            max_fails: 3,
            probe_timeout_ms: 3_000,
        }
    }
}

/// Connection parameters of a client. Swapped as a whole on reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_HOST, DEFAULT_GATEWAY_PORT)
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth_token: None,
        }
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// WebSocket URL of the gateway.
    pub fn ws_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ws://[{}]:{}", self.host, self.port)
        } else {
            format!("ws://{}:{}", self.host, self.port)
        }
    }

    /// Returns the token only if it is set and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Fixed tuning of a client instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub client_id: String,
    pub display_name: String,
    pub mode: String,
    pub role: String,
    pub scopes: Vec<String>,
    pub caps: Vec<String>,
    pub request_timeout: Duration,
    pub auth_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub health_interval: Duration,
    pub health_max_fails: u32,
    pub probe_timeout: Duration,
    /// Where to look for the gateway's own config file when no token is
    /// configured. `None` uses [`gateway_config_path`].
    pub gateway_config_path: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Config::default().settings()
    }
}

impl ClientSettings {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn with_health(mut self, interval: Duration, max_fails: u32, probe_timeout: Duration) -> Self {
        self.health_interval = interval;
        self.health_max_fails = max_fails;
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn with_gateway_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.gateway_config_path = Some(path.into());
        self
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatewayctl")
        .join("config.toml")
}

/// Returns the default data directory path.
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatewayctl")
}

/// Resolves the path of the gateway's own JSON config file.
///
/// `$GATEWAY_CONFIG_PATH` wins; otherwise `~/.openclaw/openclaw.json`.
pub fn gateway_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(GATEWAY_CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".openclaw")
        .join("openclaw.json")
}

/// Reads `gateway.auth.token` from the gateway's JSON config file.
///
/// Returns `None` when the file is missing, unreadable, not JSON, or has no
/// non-empty token.
pub fn read_gateway_token(path: &Path) -> Option<String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "gateway config not readable");
            return None;
        }
    };
    let value: Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "gateway config is not valid JSON");
            return None;
        }
    };
    value
        .pointer("/gateway/auth/token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - GATEWAY_HOST: Override gateway host
    /// - GATEWAY_PORT: Override gateway port
    /// - GATEWAY_TOKEN: Override bearer token
    /// - GATEWAYCTL_LOG_LEVEL: Override log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("GATEWAY_HOST") {
            if !host.is_empty() {
                tracing::info!("Overriding gateway host from environment: {}", host);
                self.gateway.host = host;
            }
        }

        if let Ok(port) = std::env::var("GATEWAY_PORT") {
            if !port.is_empty() {
                match port.parse::<u16>() {
                    Ok(port) => {
                        tracing::info!("Overriding gateway port from environment: {}", port);
                        self.gateway.port = port;
                    }
                    Err(e) => tracing::warn!("Ignoring invalid GATEWAY_PORT {:?}: {}", port, e),
                }
            }
        }

        if let Ok(token) = std::env::var("GATEWAY_TOKEN") {
            if !token.is_empty() {
                tracing::info!("Using gateway token from environment");
                self.gateway.token = Some(token);
            }
        }

        if let Ok(level) = std::env::var("GATEWAYCTL_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log_level from environment: {}", level);
                self.general.log_level = level;
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.gateway.port == 0 {
            return Err(ConfigError::InvalidPort(self.gateway.port));
        }

        if self.client.id.trim().is_empty() {
            return Err(ConfigError::EmptyClientField("id"));
        }
        if self.client.mode.trim().is_empty() {
            return Err(ConfigError::EmptyClientField("mode"));
        }
        if self.client.role.trim().is_empty() {
            return Err(ConfigError::EmptyClientField("role"));
        }

        let durations = [
            ("request_ms", self.timeouts.request_ms),
            ("auth_ms", self.timeouts.auth_ms),
            ("initial_backoff_ms", self.reconnect.initial_backoff_ms),
            ("interval_secs", self.health.interval_secs),
            ("probe_timeout_ms", self.health.probe_timeout_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { name });
            }
        }

        if self.reconnect.initial_backoff_ms > self.reconnect.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff {
                initial: self.reconnect.initial_backoff_ms,
                max: self.reconnect.max_backoff_ms,
            });
        }

        if self.health.max_fails == 0 {
            return Err(ConfigError::InvalidMaxFails(self.health.max_fails));
        }

        let level = self.general.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.general.log_level.clone()));
        }

        Ok(())
    }

    /// Connection parameters for a new client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.gateway.host.clone(),
            port: self.gateway.port,
            auth_token: self.gateway.token.clone(),
        }
    }

    /// Fixed tuning for a new client.
    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            client_id: self.client.id.clone(),
            display_name: self.client.display_name.clone(),
            mode: self.client.mode.clone(),
            role: self.client.role.clone(),
            scopes: self.client.scopes.clone(),
            caps: self.client.caps.clone(),
            request_timeout: Duration::from_millis(self.timeouts.request_ms),
            auth_timeout: Duration::from_millis(self.timeouts.auth_ms),
            initial_backoff: Duration::from_millis(self.reconnect.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.reconnect.max_backoff_ms),
            health_interval: Duration::from_secs(self.health.interval_secs),
            health_max_fails: self.health.max_fails,
            probe_timeout: Duration::from_millis(self.health.probe_timeout_ms),
            gateway_config_path: None,
        }
    }

    /// Path of the device identity file.
    pub fn identity_path(&self) -> PathBuf {
        self.general.data_dir.join("device.json")
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 18789);
        assert!(config.gateway.token.is_none());
        assert_eq!(config.timeouts.request_ms, 15_000);
        assert_eq!(config.timeouts.auth_ms, 10_000);
        assert_eq!(config.reconnect.initial_backoff_ms, 1_000);
        assert_eq!(config.reconnect.max_backoff_ms, 30_000);
        assert_eq!(config.health.interval_secs, 30);
        assert_eq!(config.health.max_fails, 3);
        assert_eq!(config.health.probe_timeout_ms, 3_000);
        assert!(config.restart.command.is_empty());
    }

    #[test]
    fn test_settings_from_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert_eq!(settings.auth_timeout, Duration::from_secs(10));
        assert_eq!(settings.initial_backoff, Duration::from_secs(1));
        assert_eq!(settings.max_backoff, Duration::from_secs(30));
        assert_eq!(settings.health_interval, Duration::from_secs(30));
        assert_eq!(settings.health_max_fails, 3);
        assert_eq!(settings.probe_timeout, Duration::from_secs(3));
        assert_eq!(settings.role, "operator");
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[gateway]
port = 9000
token = "abc"

[health]
enabled = true
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.token.as_deref(), Some("abc"));
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert!(config.health.enabled);
        assert_eq!(config.health.max_fails, 3);
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        let result = Config::from_toml("[gateway\nport = 1");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_from_toml_wrong_type() {
        let result = Config::from_toml("[gateway]\nport = \"not a number\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_custom() {
        let mut original = Config::default();
        original.gateway.token = Some("secret".to_string());
        original.client.scopes = vec!["operator.read".to_string()];
        original.restart.command = vec!["systemctl".to_string(), "restart".to_string()];

        let toml = original.to_toml().unwrap();
        let loaded = Config::from_toml(&toml).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = Config::default();
        original.general.log_level = "debug".to_string();
        original.health.max_fails = 5;

        original.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "invalid [ toml").unwrap();

        let err = Config::load(&config_path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_client_config_url() {
        assert_eq!(ClientConfig::new("127.0.0.1", 18789).ws_url(), "ws://127.0.0.1:18789");
        assert_eq!(ClientConfig::new("::1", 9000).ws_url(), "ws://[::1]:9000");
    }

    #[test]
    fn test_client_config_blank_token_ignored() {
        assert_eq!(ClientConfig::default().with_token("  ").token(), None);
        assert_eq!(ClientConfig::default().with_token("t").token(), Some("t"));
    }

    #[test]
    fn test_read_gateway_token() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gateway.json");

        fs::write(&path, r#"{"gateway":{"auth":{"token":"from-file"}}}"#).unwrap();
        assert_eq!(read_gateway_token(&path).as_deref(), Some("from-file"));

        fs::write(&path, r#"{"gateway":{"auth":{"token":""}}}"#).unwrap();
        assert_eq!(read_gateway_token(&path), None);

        fs::write(&path, r#"{"gateway":{}}"#).unwrap();
        assert_eq!(read_gateway_token(&path), None);

        fs::write(&path, "not json").unwrap();
        assert_eq!(read_gateway_token(&path), None);

        assert_eq!(read_gateway_token(&temp_dir.path().join("missing.json")), None);
    }

    #[test]
    #[serial]
    fn test_gateway_config_path_env_override() {
        std::env::set_var(GATEWAY_CONFIG_PATH_ENV, "/tmp/custom-gateway.json");
        assert_eq!(gateway_config_path(), PathBuf::from("/tmp/custom-gateway.json"));

        std::env::remove_var(GATEWAY_CONFIG_PATH_ENV);
        let default = gateway_config_path();
        assert!(default.ends_with(".openclaw/openclaw.json"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("GATEWAY_HOST", "10.0.0.5");
        std::env::set_var("GATEWAY_PORT", "9100");
        std::env::set_var("GATEWAY_TOKEN", "env-token");
        std::env::set_var("GATEWAYCTL_LOG_LEVEL", "debug");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.gateway.host, "10.0.0.5");
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.gateway.token.as_deref(), Some("env-token"));
        assert_eq!(config.general.log_level, "debug");

        std::env::remove_var("GATEWAY_HOST");
        std::env::remove_var("GATEWAY_PORT");
        std::env::remove_var("GATEWAY_TOKEN");
        std::env::remove_var("GATEWAYCTL_LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_port_ignored() {
        std::env::set_var("GATEWAY_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.gateway.port, DEFAULT_GATEWAY_PORT);

        std::env::remove_var("GATEWAY_PORT");
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_errors() {
        let mut config = Config::default();
        config.gateway.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort(0)));

        let mut config = Config::default();
        config.gateway.host = " ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyHost));

        let mut config = Config::default();
        config.timeouts.request_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration { name: "request_ms" })
        );

        let mut config = Config::default();
        config.reconnect.initial_backoff_ms = 60_000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidBackoff {
                initial: 60_000,
                max: 30_000
            })
        );

        let mut config = Config::default();
        config.health.max_fails = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxFails(0)));

        let mut config = Config::default();
        config.client.role = String::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyClientField("role")));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.general.log_level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.general.log_level = "warning".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel("warning".to_string()))
        );
    }
}
