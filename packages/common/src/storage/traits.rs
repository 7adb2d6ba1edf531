use std::fmt;

use async_trait::async_trait;

use super::error::StorageError;

/// Naming partition within the object store.
///
/// Raw images are uploaded to `Raw-images` and served from `Optimize-images`
/// (an external pipeline populates the optimized copies); documents live in
/// `Resume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalFolder {
    RawImages,
    OptimizedImages,
    Resumes,
}

impl LogicalFolder {
    /// The path segment used for object keys and public URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawImages => "Raw-images",
            Self::OptimizedImages => "Optimize-images",
            Self::Resumes => "Resume",
        }
    }
}

impl fmt::Display for LogicalFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folder-partitioned object storage with public URLs.
///
/// Operations are idempotent at the storage level but are not transactionally
/// linked to entity persistence; callers sequence them explicitly.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object and return its public URL (`<base>/<folder>/<name>`).
    async fn put(
        &self,
        folder: LogicalFolder,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Retrieve an object's bytes.
    async fn get(&self, folder: LogicalFolder, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete an object.
    ///
    /// Returns `false` on failure instead of an error so callers can choose
    /// an abort-vs-continue policy. Deleting an absent object succeeds.
    async fn delete(&self, folder: LogicalFolder, name: &str) -> bool;
}
