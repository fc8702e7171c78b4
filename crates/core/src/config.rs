//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound for any single object-store operation, in seconds.
    /// Keeps a slow store from hanging requests indefinitely.
    #[serde(default = "default_gateway_timeout_secs")]
    pub gateway_timeout_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            gateway_timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Get the gateway timeout as a Duration.
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}

/// Object store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory store (testing and local development only).
    Memory,
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to the ambient credential chain if
        /// not set. Prefer env vars or IAM roles over config-file secrets.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to the ambient credential chain
        /// if not set.
        secret_access_key: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO
        /// and some S3-compatible services; AWS S3 wants virtual-hosted
        /// style (false).
        #[serde(default)]
        force_path_style: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                access_key_id,
                secret_access_key,
                ..
            } => match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                (Some(_), Some(_)) | (None, None) => Ok(()),
                _ => Err(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ),
            },
            StorageConfig::Memory => Ok(()),
        }
    }
}

/// Access control configuration: which links the gateway honors.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Ordered salt set for signed links. Any listed salt validates a
    /// digest; prepend a new salt to rotate without breaking issued links.
    #[serde(default)]
    pub hash_salts: Vec<String>,
    /// First path segments served without a signature (simple mode).
    #[serde(default)]
    pub allowed_first_paths: Vec<String>,
    /// Presigned-link lifetime for simple mode, in minutes. Signed mode
    /// derives its lifetime from the token instead.
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u64,
}

fn default_duration_minutes() -> u64 {
    60
}

impl AccessConfig {
    /// Validate access configuration.
    ///
    /// At least one link mode must be configured, otherwise the gateway can
    /// never authorize anything.
    pub fn validate(&self) -> Result<(), String> {
        if self.hash_salts.is_empty() && self.allowed_first_paths.is_empty() {
            return Err(
                "access config requires hash_salts (signed mode) or allowed_first_paths \
                 (simple mode)"
                    .to_string(),
            );
        }
        if self.duration_minutes == 0 {
            return Err("access.duration_minutes must be at least 1".to_string());
        }
        Ok(())
    }

    /// Get the simple-mode presign lifetime as a Duration.
    pub fn presign_duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes * 60)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object store backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Access control configuration.
    pub access: AccessConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses the memory store, one known salt, and one
    /// allow-listed first path.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Memory,
            access: AccessConfig {
                hash_salts: vec!["test-salt".to_string()],
                allowed_first_paths: vec!["public".to_string()],
                duration_minutes: 60,
            },
        }
    }
}
