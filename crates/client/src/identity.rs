//! Device identity persistence.
//!
//! The gateway client signs every connect handshake with a long-lived
//! Ed25519 key. [`IdentityProvider`] abstracts where that key comes from;
//! [`FileIdentityStore`] keeps it in a JSON file under the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gateway_protocol::DeviceIdentity;
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
const IDENTITY_FILE_VERSION: u32 = 1;

/// Source of the device identity used to sign connect requests.
///
/// Called at most once per client; the result is cached.
pub trait IdentityProvider: Send + Sync {
    /// Returns the persisted identity, creating and persisting one if none
    /// exists yet.
    fn load_or_create(&self) -> Result<DeviceIdentity>;
}

/// A fixed in-memory identity.
impl IdentityProvider for DeviceIdentity {
    fn load_or_create(&self) -> Result<DeviceIdentity> {
        Ok(self.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFile {
    version: u32,
    device_id: String,
    secret_key: String,
}

/// Identity kept at `<data_dir>/device.json`.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Creates a store backed by `path`. Nothing is read until
    /// [`IdentityProvider::load_or_create`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `device.json` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("device.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the identity file. Returns `Ok(None)` if it does not exist.
    pub fn load(&self) -> Result<Option<DeviceIdentity>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read identity file: {}", self.path.display()))?;
        let file: IdentityFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse identity file: {}", self.path.display()))?;

        if file.version != IDENTITY_FILE_VERSION {
            bail!(
                "Unsupported identity file version {} in {}",
                file.version,
                self.path.display()
            );
        }

        let identity = DeviceIdentity::from_secret_key_base64url(&file.secret_key)
            .with_context(|| format!("Invalid secret key in {}", self.path.display()))?;

        if identity.device_id() != file.device_id {
            bail!(
                "Identity file {} is inconsistent: stored device id does not match key",
                self.path.display()
            );
        }

        Ok(Some(identity))
    }

    /// Writes `identity` to disk.
    ///
    /// Uses atomic write (write to temp file, then rename). The file is
    /// readable only by the owner on Unix.
    pub fn save(&self, identity: &DeviceIdentity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create identity directory: {}", parent.display())
            })?;
        }

        let file = IdentityFile {
            version: IDENTITY_FILE_VERSION,
            device_id: identity.device_id().to_string(),
            secret_key: gateway_protocol::crypto::base64url_encode(&identity.secret_key_bytes()),
        };
        let contents =
            serde_json::to_string_pretty(&file).context("Failed to serialize identity file")?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &contents).with_context(|| {
            format!("Failed to write temp identity file: {}", temp_path.display())
        })?;
        restrict_permissions(&temp_path)?;

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename temp identity file {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!(path = %self.path.display(), "device identity saved");
        Ok(())
    }
}

impl IdentityProvider for FileIdentityStore {
    fn load_or_create(&self) -> Result<DeviceIdentity> {
        if let Some(identity) = self.load()? {
            tracing::debug!(device_id = %identity.device_id(), "loaded device identity");
            return Ok(identity);
        }

        let identity = DeviceIdentity::generate();
        self.save(&identity)?;
        tracing::info!(
            device_id = %identity.device_id(),
            path = %self.path.display(),
            "created new device identity"
        );
        Ok(identity)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
