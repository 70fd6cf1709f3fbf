use super::voice_mapping::is_voice_neural_compatible;
use super::{BackendAudio, BackendCapabilities, MarkOffset, SynthesisBackend, SynthesisRequest};
use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, SpeechMarkType, TextType, VoiceId},
    Client as PollyClient,
};
use serde::Deserialize;
use std::sync::Arc;

const PROVIDER: &str = "polly";

/// AWS Polly implementation of the synthesis backend.
///
/// Polly has no inline time points; timing comes from a second call that
/// requests post-hoc speech marks as JSON lines, one object per mark.
pub struct PollyTtsBackend {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsBackend {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    fn engine_for(voice_id: &str) -> Engine {
        if is_voice_neural_compatible(voice_id) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }

    /// Call Polly once for the audio stream.
    async fn fetch_audio(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        let voice_id = VoiceId::from(request.voice_id.as_str());
        let engine = Self::engine_for(&request.voice_id);

        let result = self
            .polly_client
            .synthesize_speech()
            .text(&request.body)
            .text_type(TextType::Ssml)
            .voice_id(voice_id.clone())
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    voice_id = ?voice_id,
                    engine = ?engine,
                    request_bytes = request.body.len(),
                    "AWS Polly synthesize_speech failed"
                );
                SynthesisError::backend(PROVIDER, format!("{e:?}"))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::backend(PROVIDER, format!("audio stream: {e}"))
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }

    /// Call Polly a second time for the speech-mark report.
    async fn fetch_speech_marks(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Vec<MarkOffset>, SynthesisError> {
        let voice_id = VoiceId::from(request.voice_id.as_str());
        let engine = Self::engine_for(&request.voice_id);

        let result = self
            .polly_client
            .synthesize_speech()
            .text(&request.body)
            .text_type(TextType::Ssml)
            .voice_id(voice_id)
            .output_format(OutputFormat::Json)
            .speech_mark_types(SpeechMarkType::Ssml)
            .engine(engine)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    request_bytes = request.body.len(),
                    "AWS Polly speech-mark request failed"
                );
                SynthesisError::backend(PROVIDER, format!("{e:?}"))
            })?;

        let marks_stream = result.audio_stream.collect().await.map_err(|e| {
            SynthesisError::backend(PROVIDER, format!("speech-mark stream: {e}"))
        })?;

        parse_speech_marks(&marks_stream.into_bytes())
    }
}

#[derive(Debug, Deserialize)]
struct SpeechMark {
    time: u64,
    #[serde(rename = "type")]
    mark_type: String,
    value: String,
}

/// Polly speech marks arrive as newline-delimited JSON objects. Only `ssml`
/// marks carry our unit anchors; word and sentence marks are ignored.
fn parse_speech_marks(raw: &[u8]) -> Result<Vec<MarkOffset>, SynthesisError> {
    let text = String::from_utf8_lossy(raw);
    let mut marks = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mark: SpeechMark = serde_json::from_str(line)
            .map_err(|e| SynthesisError::backend(PROVIDER, format!("speech mark line: {e}")))?;
        if mark.mark_type == "ssml" {
            marks.push(MarkOffset {
                mark_name: mark.value,
                offset_ms: mark.time,
            });
        }
    }
    Ok(marks)
}

#[async_trait]
impl SynthesisBackend for PollyTtsBackend {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_inline_marks: false,
            supports_post_hoc_marks: true,
            supports_control_tokens: false,
        }
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<BackendAudio, SynthesisError> {
        tracing::info!(
            provider = PROVIDER,
            voice = %request.voice_id,
            engine = ?Self::engine_for(&request.voice_id),
            request_bytes = request.body.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let audio = self.fetch_audio(request).await?;
        let marks = self.fetch_speech_marks(request).await?;

        tracing::debug!(
            provider = PROVIDER,
            audio_size = audio.len(),
            mark_count = marks.len(),
            "Polly audio and speech marks received"
        );

        Ok(BackendAudio {
            audio,
            marks: Some(marks),
        })
    }
}
