//! Object storage adapters for avatar files.

mod local;
mod s3;

use std::sync::Arc;

pub use local::LocalObjectStorage;
pub use s3::S3ObjectStorage;

use url::Url;

use crate::config::ObjectStorageConfig;
use crate::domain::ports::{ObjectStorage, StorageError};

/// Build the adapter selected in configuration.
///
/// # Errors
/// Returns an error when the backend configuration is unusable.
pub fn build_object_storage(cfg: &ObjectStorageConfig) -> anyhow::Result<Arc<dyn ObjectStorage>> {
    let storage: Arc<dyn ObjectStorage> = match cfg {
        ObjectStorageConfig::S3(s3) => {
            tracing::info!(endpoint = %s3.endpoint_url, bucket = %s3.bucket, "using S3 object storage");
            Arc::new(S3ObjectStorage::new(s3)?)
        }
        ObjectStorageConfig::Local(local) => {
            tracing::info!(base_dir = %local.base_dir.display(), "using local object storage");
            Arc::new(LocalObjectStorage::new(local)?)
        }
    };
    Ok(storage)
}

/// Parse a base URL that storage keys are appended to.
fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).map_err(|e| anyhow::anyhow!("invalid base url '{raw}': {e}"))?;
    anyhow::ensure!(!url.cannot_be_a_base(), "base url '{raw}' cannot carry a path");
    Ok(url)
}

/// Append every `/`-separated segment of `key` to the path of `base`.
/// Segments are percent-encoded, so `#` or `?` in a file name stay in the path.
fn join_url(base: &Url, key: &str) -> Result<Url, StorageError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| StorageError::InvalidKey(key.to_owned()))?
        .pop_if_empty()
        .extend(key.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(raw: &str) -> Url {
        parse_base_url(raw).unwrap()
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url(&base("http://minio:9000/"), "/avatars/7_cat.png")
                .unwrap()
                .as_str(),
            "http://minio:9000/avatars/7_cat.png"
        );
        assert_eq!(
            join_url(&base("http://minio:9000/bucket"), "avatars/a.png")
                .unwrap()
                .as_str(),
            "http://minio:9000/bucket/avatars/a.png"
        );
    }

    #[test]
    fn join_url_keeps_reserved_characters_in_path() {
        let url = join_url(&base("http://minio:9000/bucket/"), "avatars/7_my#cat.png").unwrap();
        assert_eq!(url.path(), "/bucket/avatars/7_my%23cat.png");
        assert_eq!(url.fragment(), None);

        let url = join_url(&base("http://minio:9000/bucket"), "avatars/7_why?.png").unwrap();
        assert_eq!(url.path(), "/bucket/avatars/7_why%3F.png");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn base_url_must_be_absolute_and_hierarchical() {
        assert!(parse_base_url("minio").is_err());
        assert!(parse_base_url("mailto:ops@example.com").is_err());
    }
}
