pub mod s3_storage;

pub use s3_storage::S3StorageRepository;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed for {filename}: {message}")]
    Upload { filename: String, message: String },
}

/// Repository for persisting finished audio artifacts.
/// Abstracts the underlying object store so the assembler never sees
/// transport details.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload one artifact and return its public URL.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<String, StorageError>;
}
