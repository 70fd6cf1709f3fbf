pub mod google_tts_backend;
pub mod openai_tts_backend;
pub mod polly_tts_backend;
pub mod voice_mapping;

pub use google_tts_backend::GoogleTtsBackend;
pub use openai_tts_backend::OpenAiTtsBackend;
pub use polly_tts_backend::PollyTtsBackend;

use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;

/// What timing signal a backend family can produce. The dispatcher branches
/// on capabilities, never on vendor strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Named marks inside the request markup, reported with time points
    /// alongside the audio.
    pub supports_inline_marks: bool,
    /// A post-hoc speech-mark report, separate from the audio response.
    pub supports_post_hoc_marks: bool,
    /// Parenthesized directive words inside plain text.
    pub supports_control_tokens: bool,
}

impl BackendCapabilities {
    /// Whether per-unit boundaries can be recovered from a batched call.
    pub fn has_timing_signal(&self) -> bool {
        self.supports_inline_marks || self.supports_post_hoc_marks
    }
}

/// One synthesis invocation. `body` is markup or plain text depending on the
/// backend's dialect; `speed` is the effective ratio (unit speed multiplied
/// by the playback variant).
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub body: String,
    pub voice_id: String,
    pub language_code: String,
    pub speed: f32,
    pub pitch: f32,
}

/// A named mark resolved to its millisecond offset in the returned audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOffset {
    pub mark_name: String,
    pub offset_ms: u64,
}

/// Raw backend output: audio bytes plus mark offsets when the backend
/// provides a timing signal.
#[derive(Debug, Clone)]
pub struct BackendAudio {
    pub audio: Vec<u8>,
    pub marks: Option<Vec<MarkOffset>>,
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying provider (Google Cloud TTS, AWS Polly, OpenAI).
///
/// Implementations are responsible for:
/// - Provider-specific request encoding and audio decoding
/// - Reporting mark offsets in milliseconds when the provider supports them
/// - Returning `marks: None` when no timing signal is available
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Short provider tag used in logs and error messages.
    fn provider(&self) -> &'static str;

    fn capabilities(&self) -> BackendCapabilities;

    /// Synthesize one request. Returns audio ready for assembly (MP3 format).
    async fn synthesize(&self, request: &SynthesisRequest)
        -> Result<BackendAudio, SynthesisError>;
}
