use crate::infrastructure::audio::AudioToolkitError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("audio toolkit error: {0}")]
    Audio(#[from] AudioToolkitError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
