use super::{StorageError, StorageRepository};
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use std::sync::Arc;

/// S3 implementation of the storage repository. Objects are addressed as
/// `{folder}/{filename}` and exposed through the bucket's public URL.
pub struct S3StorageRepository {
    s3_client: Arc<S3Client>,
    bucket: String,
    region: String,
}

impl S3StorageRepository {
    pub fn new(s3_client: Arc<S3Client>, bucket: String, region: String) -> Self {
        Self {
            s3_client,
            bucket,
            region,
        }
    }

    fn object_key(folder: &str, filename: &str) -> String {
        if folder.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", folder.trim_end_matches('/'), filename)
        }
    }
}

#[async_trait]
impl StorageRepository for S3StorageRepository {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<String, StorageError> {
        let key = Self::object_key(folder, filename);
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 put_object failed"
                );
                StorageError::Upload {
                    filename: filename.to_string(),
                    message: format!("{e:?}"),
                }
            })?;

        let url = format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        );

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            "Artifact uploaded"
        );

        Ok(url)
    }
}
