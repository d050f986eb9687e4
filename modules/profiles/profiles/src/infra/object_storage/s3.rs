use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use url::Url;

use super::{join_url, parse_base_url};
use crate::config::S3StorageConfig;
use crate::domain::ports::{ObjectStorage, StorageError};

/// S3-compatible object storage (AWS S3, `MinIO`) with static credentials.
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    public_base: Url,
}

impl S3ObjectStorage {
    /// # Errors
    /// Fails when the endpoint or public URL cannot be parsed.
    pub fn new(cfg: &S3StorageConfig) -> anyhow::Result<Self> {
        Url::parse(&cfg.endpoint_url)
            .map_err(|e| anyhow::anyhow!("invalid S3 endpoint_url '{}': {e}", cfg.endpoint_url))?;

        let public = cfg.public_url.as_deref().unwrap_or(&cfg.endpoint_url);
        let public_base = join_url(&parse_base_url(public)?, &cfg.bucket)
            .map_err(|e| anyhow::anyhow!("invalid S3 public url '{public}': {e}"))?;

        let credentials = Credentials::new(
            cfg.access_key.clone(),
            cfg.secret_key.expose().to_owned(),
            None,
            None,
            "profiles-config",
        );
        let conf = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(&cfg.endpoint_url)
            .credentials_provider(credentials)
            .force_path_style(cfg.force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_base,
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, size, "object stored");
        Ok(())
    }

    async fn get_file_url(&self, key: &str) -> Result<Url, StorageError> {
        join_url(&self.public_base, key)
    }
}
