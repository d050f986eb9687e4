//! Outbound ports consumed by the domain service.

use async_trait::async_trait;
use bytes::Bytes;
use profiles_sdk::AccountId;
use thiserror::Error;
use url::Url;

/// Claims the service needs from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub user_id: AccountId,
}

/// Token verification failure. The message is returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token has expired.")]
    Expired,
    #[error("Invalid token.")]
    Invalid,
}

pub trait AccessTokenDecoder: Send + Sync {
    /// Verify `token` and extract its claims.
    ///
    /// # Errors
    /// Returns [`TokenError`] when the token is expired, malformed or carries
    /// a bad signature.
    fn decode_access_token(&self, token: &str) -> Result<AccessClaims, TokenError>;
}

/// Object storage failure. Details are logged, never shown to clients.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid object url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public URL of the object stored under `key`.
    async fn get_file_url(&self, key: &str) -> Result<Url, StorageError>;
}
