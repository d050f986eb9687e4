use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use url::Url;

use super::{join_url, parse_base_url};
use crate::config::LocalStorageConfig;
use crate::domain::ports::{ObjectStorage, StorageError};

/// Stores objects as files below a base directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    base_dir: PathBuf,
    public_base_url: Url,
}

impl LocalObjectStorage {
    /// # Errors
    /// Fails when the public base URL cannot be parsed.
    pub fn new(cfg: &LocalStorageConfig) -> anyhow::Result<Self> {
        Ok(Self {
            base_dir: cfg.base_dir.clone(),
            public_base_url: parse_base_url(&cfg.public_base_url)?,
        })
    }

    /// Only plain relative keys are accepted, never `..` or absolute paths.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(key);
        let plain = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.base_dir.join(rel))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await?;
        tracing::debug!(path = %path.display(), size = data.len(), "object stored");
        Ok(())
    }

    async fn get_file_url(&self, key: &str) -> Result<Url, StorageError> {
        self.path_for(key)?;
        join_url(&self.public_base_url, key)
    }
}
