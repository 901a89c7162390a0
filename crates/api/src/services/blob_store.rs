//! Filesystem blob store for uploaded slide images and music.
//!
//! Objects are written under `media_dir/<key>` and served back by the
//! static `/media` route, so the public URL is `public_url_prefix/<key>`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use domain::services::{BlobError, BlobStore};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_url_prefix: public_url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Creates the media root if missing.
    pub async fn initialize(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!(root = ?self.root, "Blob store initialized");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys are relative paths of normal segments only.
    fn object_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url_prefix, key)
    }
}

async fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp_path, path).await
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError> {
        let path = self.object_path(key)?;
        let io_err = |e: std::io::Error| BlobError::Upload(format!("{}: {}", key, e));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        // Write to a temp file first so readers never see a partial object.
        let temp_path = path.with_extension("part");
        if let Err(e) = write_then_rename(&temp_path, &path, &bytes).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = ?temp_path, error = %cleanup, "Failed to remove temp blob");
                }
            }
            return Err(io_err(e));
        }

        tracing::debug!(key, content_type, size = bytes.len(), "Stored blob");
        Ok(self.public_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalBlobStore {
        let root = std::env::temp_dir().join(format!("bw-blobs-{}", uuid::Uuid::new_v4()));
        LocalBlobStore::new(root, "/media/")
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let store = temp_store();
        let url = store
            .upload("wish-images/abc/1-0.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "/media/wish-images/abc/1-0.png");
        let written = tokio::fs::read(store.root().join("wish-images/abc/1-0.png"))
            .await
            .unwrap();
        assert_eq!(written, vec![1, 2, 3]);
        assert!(!store.root().join("wish-images/abc/1-0.part").exists());

        tokio::fs::remove_dir_all(store.root()).await.ok();
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let store = temp_store();
        for key in ["../escape.png", "/etc/passwd", "a/../../b", ""] {
            let result = store.upload(key, vec![0], "image/png").await;
            assert!(
                matches!(result, Err(BlobError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let store = temp_store();
        let occupied = store.root().join("wish-images/abc/1-0.png");
        tokio::fs::create_dir_all(occupied.join("inner")).await.unwrap();

        let result = store
            .upload("wish-images/abc/1-0.png", vec![1, 2, 3], "image/png")
            .await;

        assert!(matches!(result, Err(BlobError::Upload(_))));
        assert!(!store.root().join("wish-images/abc/1-0.part").exists());

        tokio::fs::remove_dir_all(store.root()).await.ok();
    }

    #[tokio::test]
    async fn test_initialize_creates_root() {
        let store = temp_store();
        store.initialize().await.unwrap();
        assert!(store.root().is_dir());
        tokio::fs::remove_dir_all(store.root()).await.ok();
    }
}
