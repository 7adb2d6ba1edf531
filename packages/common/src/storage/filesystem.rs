use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{LogicalFolder, ObjectStore};

/// Filesystem-backed object store for development and tests.
///
/// Objects live under `{base_path}/{folder}/{name}`; public URLs are built
/// from a configured base so the URL shape matches the S3 backend.
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemObjectStore {
    pub async fn new(
        base_path: PathBuf,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        for folder in [
            LogicalFolder::RawImages,
            LogicalFolder::OptimizedImages,
            LogicalFolder::Resumes,
        ] {
            fs::create_dir_all(base_path.join(folder.as_str())).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn object_path(&self, folder: LogicalFolder, name: &str) -> PathBuf {
        self.base_path.join(folder.as_str()).join(name)
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(
        &self,
        folder: LogicalFolder,
        name: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if bytes.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: bytes.len() as u64,
                limit: self.max_size,
            });
        }

        fs::write(self.object_path(folder, name), bytes).await?;
        Ok(format!("{}/{}/{}", self.public_base_url, folder, name))
    }

    async fn get(&self, folder: LogicalFolder, name: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.object_path(folder, name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{folder}/{name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, folder: LogicalFolder, name: &str) -> bool {
        match fs::remove_file(self.object_path(folder, name)).await {
            Ok(()) => true,
            // Absent objects delete successfully, matching S3 semantics.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::error!("failed to delete {}/{}: {}", folder, name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (FilesystemObjectStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemObjectStore::new(
            dir.path().join("objects"),
            "https://assets.test",
            10 * 1024 * 1024,
        )
        .await
        .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_get_round_trip() {
        let (store, _dir) = temp_store().await;
        let url = store
            .put(LogicalFolder::RawImages, "a.png", b"png bytes", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "https://assets.test/Raw-images/a.png");

        let bytes = store.get(LogicalFolder::RawImages, "a.png").await.unwrap();
        assert_eq!(bytes, b"png bytes");
    }

    #[tokio::test]
    async fn folders_partition_the_namespace() {
        let (store, _dir) = temp_store().await;
        store
            .put(LogicalFolder::Resumes, "cv.pdf", b"pdf", "application/pdf")
            .await
            .unwrap();

        assert!(matches!(
            store.get(LogicalFolder::RawImages, "cv.pdf").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let (store, _dir) = temp_store().await;
        let result = store.get(LogicalFolder::OptimizedImages, "nope.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let (store, _dir) = temp_store().await;
        store
            .put(LogicalFolder::RawImages, "gone.png", b"x", "image/png")
            .await
            .unwrap();

        assert!(store.delete(LogicalFolder::RawImages, "gone.png").await);
        assert!(matches!(
            store.get(LogicalFolder::RawImages, "gone.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_absent_object_succeeds() {
        let (store, _dir) = temp_store().await;
        assert!(store.delete(LogicalFolder::Resumes, "never-stored.pdf").await);
    }

    #[tokio::test]
    async fn size_limit_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemObjectStore::new(dir.path().join("objects"), "https://assets.test", 8)
            .await
            .unwrap();

        let result = store
            .put(LogicalFolder::RawImages, "big.png", b"more than 8 bytes", "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::SizeLimitExceeded { .. })));
    }
}
