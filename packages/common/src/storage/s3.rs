use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::traits::{LogicalFolder, ObjectStore};

/// S3-backed object store serving public URLs under a fixed bucket/region.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    bucket_name: String,
    region: String,
    max_size: u64,
}

impl S3ObjectStore {
    /// Connect to a bucket. Credentials come from the environment
    /// (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`).
    pub fn new(bucket_name: &str, region: &str, max_size: u64) -> Result<Self, StorageError> {
        let credentials =
            Credentials::default().map_err(|e| StorageError::Transport(e.to_string()))?;
        let bucket = Bucket::new(
            bucket_name,
            Region::Custom {
                region: region.to_string(),
                endpoint: format!("https://s3.{region}.amazonaws.com"),
            },
            credentials,
        )
        .map_err(|e| StorageError::Transport(e.to_string()))?;

        Ok(Self {
            bucket,
            bucket_name: bucket_name.to_string(),
            region: region.to_string(),
            max_size,
        })
    }

    fn key(folder: LogicalFolder, name: &str) -> String {
        format!("{}/{}", folder.as_str(), name)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket_name, self.region, key
        )
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        folder: LogicalFolder,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        if bytes.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: bytes.len() as u64,
                limit: self.max_size,
            });
        }

        let key = Self::key(folder, name);
        self.bucket
            .put_object_with_content_type(&key, bytes, content_type)
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        Ok(self.public_url(&key))
    }

    async fn get(&self, folder: LogicalFolder, name: &str) -> Result<Vec<u8>, StorageError> {
        let key = Self::key(folder, name);
        match self.bucket.get_object(&key).await {
            Ok(data) => Ok(data.bytes().to_vec()),
            Err(S3Error::HttpFailWithBody(404, _)) => Err(StorageError::NotFound(key)),
            Err(e) => Err(StorageError::Transport(e.to_string())),
        }
    }

    async fn delete(&self, folder: LogicalFolder, name: &str) -> bool {
        let key = Self::key(folder, name);
        match self.bucket.delete_object(&key).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("failed to delete {}: {}", key, e);
                false
            }
        }
    }
}
