use std::fmt;
use std::path::PathBuf;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::validation::ValidationPolicy;

/// Configuration for the profiles module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilesConfig {
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub storage: ObjectStorageConfig,
    #[serde(default)]
    pub validation: ValidationPolicy,
}

/// Access token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    /// HMAC secret used to verify access tokens. Required at startup.
    #[serde(default)]
    pub secret_key_access: Option<SecretString>,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Lifetime of tokens issued by `JwtAuthManager::create_access_token`.
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret_key_access: None,
            algorithm: default_algorithm(),
            access_token_ttl_minutes: default_access_token_ttl_minutes(),
            leeway_seconds: default_leeway_seconds(),
        }
    }
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

fn default_access_token_ttl_minutes() -> i64 {
    60
}

fn default_leeway_seconds() -> u64 {
    0
}

/// Object storage backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ObjectStorageConfig {
    S3(S3StorageConfig),
    Local(LocalStorageConfig),
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self::Local(LocalStorageConfig::default())
    }
}

/// S3-compatible storage (AWS S3, `MinIO`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    pub endpoint_url: String,
    /// Base used to build avatar URLs; falls back to `endpoint_url`.
    #[serde(default)]
    pub public_url: Option<String>,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key: String,
    pub secret_key: SecretString,
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_force_path_style() -> bool {
    true
}

/// Local filesystem storage, mainly for development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("data/media")
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8087/media".to_owned()
}

/// Secret configuration value.
///
/// `Debug`, `Display` and `Serialize` never expose the value; the buffer is
/// zeroed on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read-only access to the secret. Do not log the result.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***REDACTED***")
    }
}
