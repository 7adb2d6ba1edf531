use common::storage::{self, LogicalFolder, ObjectStore};

use super::naming::{PreparedUpload, transform_asset_url};
use crate::error::AppError;

/// Replace an image asset (avatar or company logo).
///
/// Sequence: delete the old optimized blob when one exists, upload the new
/// bytes to the raw-image folder, rewrite the returned URL to the optimized
/// folder, and resolve the final extension from the upload tag. A failed
/// delete aborts before any upload, leaving the caller's stored URL valid.
/// A failed upload after a successful delete is reported without rollback;
/// the caller keeps its (now dangling) URL. The steps are not linked to
/// entity persistence, so two racing replacements may leak one orphaned
/// blob.
///
/// Returns the new URL to persist; the caller mutates its entity only on
/// success.
pub async fn replace_image_asset(
    store: &dyn ObjectStore,
    current_url: Option<&str>,
    upload: &PreparedUpload,
) -> Result<String, AppError> {
    delete_current(store, LogicalFolder::OptimizedImages, current_url, "image").await?;

    let raw_url = store
        .put(
            LogicalFolder::RawImages,
            &upload.object_name,
            &upload.bytes,
            &upload.content_type,
        )
        .await
        .map_err(|e| AppError::Storage(format!("Upload failed: {e}")))?;

    let optimized_url = storage::rename_url_segment(
        &raw_url,
        LogicalFolder::RawImages,
        LogicalFolder::OptimizedImages,
    )
    .ok_or_else(|| AppError::Internal("upload URL missing raw-image segment".into()))?;

    transform_asset_url(&optimized_url)
        .ok_or_else(|| AppError::Internal("upload URL missing extension tag".into()))
}

/// Replace a document asset (resume).
///
/// Same delete-then-upload sequence as images, but documents live in the
/// resume folder and their URLs are stored exactly as returned.
pub async fn replace_document_asset(
    store: &dyn ObjectStore,
    current_url: Option<&str>,
    upload: &PreparedUpload,
) -> Result<String, AppError> {
    delete_current(store, LogicalFolder::Resumes, current_url, "resume").await?;

    store
        .put(
            LogicalFolder::Resumes,
            &upload.object_name,
            &upload.bytes,
            &upload.content_type,
        )
        .await
        .map_err(|e| AppError::Storage(format!("Upload failed: {e}")))
}

async fn delete_current(
    store: &dyn ObjectStore,
    folder: LogicalFolder,
    current_url: Option<&str>,
    label: &str,
) -> Result<(), AppError> {
    let Some(url) = current_url.filter(|u| !u.is_empty()) else {
        return Ok(());
    };
    let Some(name) = storage::object_name(url) else {
        return Ok(());
    };
    if store.delete(folder, name).await {
        Ok(())
    } else {
        Err(AppError::Storage(format!("Failed to delete old {label}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use common::storage::StorageError;

    use super::*;
    use crate::assets::naming::{AssetKind, prepare_upload};

    /// In-memory store with scripted failures, recording every call.
    #[derive(Default)]
    struct ScriptedStore {
        fail_delete: bool,
        fail_put: bool,
        deletes: Mutex<Vec<String>>,
        puts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStore for ScriptedStore {
        async fn put(
            &self,
            folder: LogicalFolder,
            name: &str,
            _bytes: &[u8],
            _content_type: &str,
        ) -> Result<String, StorageError> {
            if self.fail_put {
                return Err(StorageError::Transport("connection reset".into()));
            }
            let key = format!("{folder}/{name}");
            self.puts.lock().unwrap().push(key.clone());
            Ok(format!("https://assets.test/{key}"))
        }

        async fn get(&self, folder: LogicalFolder, name: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::NotFound(format!("{folder}/{name}")))
        }

        async fn delete(&self, folder: LogicalFolder, name: &str) -> bool {
            if self.fail_delete {
                return false;
            }
            self.deletes.lock().unwrap().push(format!("{folder}/{name}"));
            true
        }
    }

    fn avatar_upload() -> PreparedUpload {
        let now = "2025-06-01T09:30:05".parse().unwrap();
        prepare_upload(AssetKind::Avatar, "me.jpg", vec![1, 2, 3], 1024, now).unwrap()
    }

    fn resume_upload() -> PreparedUpload {
        let now = "2025-06-01T09:30:05".parse().unwrap();
        prepare_upload(AssetKind::Resume, "cv.pdf", vec![1], 1024, now).unwrap()
    }

    #[tokio::test]
    async fn first_image_upload_skips_delete() {
        let store = ScriptedStore::default();
        let url = replace_image_asset(&store, None, &avatar_upload())
            .await
            .unwrap();

        assert!(store.deletes.lock().unwrap().is_empty());
        assert_eq!(
            url,
            "https://assets.test/Optimize-images/2025-06-01-093005-avatar.png"
        );
    }

    #[tokio::test]
    async fn empty_current_url_counts_as_absent() {
        let store = ScriptedStore::default();
        replace_image_asset(&store, Some(""), &avatar_upload())
            .await
            .unwrap();
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replacement_deletes_old_blob_then_uploads() {
        let store = ScriptedStore::default();
        let old = "https://assets.test/Optimize-images/2024-12-31-000000-avatar.png";
        let url = replace_image_asset(&store, Some(old), &avatar_upload())
            .await
            .unwrap();

        assert_eq!(
            *store.deletes.lock().unwrap(),
            vec!["Optimize-images/2024-12-31-000000-avatar.png".to_string()]
        );
        assert_ne!(url, old);
    }

    #[tokio::test]
    async fn failed_delete_aborts_before_upload() {
        let store = ScriptedStore {
            fail_delete: true,
            ..Default::default()
        };
        let old = "https://assets.test/Optimize-images/2024-12-31-000000-avatar.png";
        let result = replace_image_asset(&store, Some(old), &avatar_upload()).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        // Nothing was uploaded, so the stored URL stays valid.
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_after_delete_is_reported_without_rollback() {
        let store = ScriptedStore {
            fail_put: true,
            ..Default::default()
        };
        let old = "https://assets.test/Optimize-images/2024-12-31-000000-avatar.png";
        let result = replace_image_asset(&store, Some(old), &avatar_upload()).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn resume_goes_to_the_document_folder_untransformed() {
        let store = ScriptedStore::default();
        let old = "https://assets.test/Resume/2024-12-31-000000-resume.pdf";
        let url = replace_document_asset(&store, Some(old), &resume_upload())
            .await
            .unwrap();

        assert_eq!(
            *store.deletes.lock().unwrap(),
            vec!["Resume/2024-12-31-000000-resume.pdf".to_string()]
        );
        assert_eq!(url, "https://assets.test/Resume/2025-06-01-093005-resume.pdf");
    }

    #[tokio::test]
    async fn old_blob_is_gone_after_successful_replacement() {
        use common::storage::filesystem::FilesystemObjectStore;

        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemObjectStore::new(
            dir.path().join("objects"),
            "https://assets.test",
            1024 * 1024,
        )
        .await
        .unwrap();

        let old_url = store
            .put(
                LogicalFolder::OptimizedImages,
                "2024-12-31-000000-avatar.png",
                b"old",
                "image/png",
            )
            .await
            .unwrap();

        let new_url = replace_image_asset(&store, Some(&old_url), &avatar_upload())
            .await
            .unwrap();
        assert_ne!(new_url, old_url);

        let result = store
            .get(LogicalFolder::OptimizedImages, "2024-12-31-000000-avatar.png")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
