use crate::infrastructure::audio::AudioToolkitError;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("backend error ({provider}): {message}")]
    Backend { provider: String, message: String },

    #[error("audio toolkit error: {0}")]
    Audio(#[from] AudioToolkitError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SynthesisError {
    pub fn backend(provider: &str, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
