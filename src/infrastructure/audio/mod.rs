pub mod ffmpeg;

pub use ffmpeg::FfmpegAudioToolkit;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum AudioToolkitError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with status {status}: {stderr}")]
    Failed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("could not parse {tool} output: {output}")]
    UnparsableOutput { tool: String, output: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow adapter over the external audio-processing utility.
/// Abstracts the subprocess so assembly and dispatch logic stay unit-testable
/// without invoking a real binary.
///
/// Implementations are responsible for:
/// - Writing temporary on-disk artifacts into scoped directories that are
///   removed on success and failure alike
/// - Blocking until the underlying process has exited
#[async_trait]
pub trait AudioToolkit: Send + Sync {
    /// Concatenate ordered audio segments into one continuous stream.
    async fn concat(&self, segments: &[Vec<u8>]) -> Result<Vec<u8>, AudioToolkitError>;

    /// Probe a segment's duration, returned in integer milliseconds
    /// (probed seconds rounded).
    async fn duration_ms(&self, audio: &[u8]) -> Result<u64, AudioToolkitError>;

    /// Cut `[start_ms, end_ms)` out of a stream; `None` means to the end.
    async fn slice(
        &self,
        audio: &[u8],
        start_ms: u64,
        end_ms: Option<u64>,
    ) -> Result<Vec<u8>, AudioToolkitError>;

    /// Generate a silent segment of the given duration.
    async fn generate_silence(&self, seconds: f32) -> Result<Vec<u8>, AudioToolkitError>;

    /// Remove trailing silence from a stream.
    async fn trim_trailing_silence(&self, audio: &[u8]) -> Result<Vec<u8>, AudioToolkitError>;
}
