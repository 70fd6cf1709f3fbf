use super::{BackendAudio, BackendCapabilities, SynthesisBackend, SynthesisRequest};
use crate::domain::synthesis::routing::MARKLESS_VOICE_PREFIX;
use crate::domain::synthesis::SynthesisError;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

const PROVIDER: &str = "openai";

/// OpenAI TTS implementation of the synthesis backend.
///
/// Mark-less: the API returns audio only, so batches routed here always
/// degrade to one call per unit. Parenthesized control tokens in the input
/// are the only steering mechanism the provider offers.
pub struct OpenAiTtsBackend {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTtsBackend {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    /// Voice identifiers arrive with the provider prefix (`openai:alloy`).
    fn parse_voice(voice_id: &str) -> Voice {
        let name = voice_id
            .strip_prefix(MARKLESS_VOICE_PREFIX)
            .unwrap_or(voice_id);
        match name.to_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy, // Default fallback
        }
    }

    fn parse_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl SynthesisBackend for OpenAiTtsBackend {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_inline_marks: false,
            supports_post_hoc_marks: false,
            supports_control_tokens: true,
        }
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<BackendAudio, SynthesisError> {
        let voice = Self::parse_voice(&request.voice_id);

        tracing::info!(
            provider = PROVIDER,
            model = %self.model,
            voice = ?voice,
            speed = request.speed,
            request_bytes = request.body.len(),
            "Calling OpenAI TTS API"
        );

        let speech_request = CreateSpeechRequest {
            model: self.parse_model(),
            input: request.body.clone(),
            voice,
            response_format: None, // Defaults to MP3
            speed: Some(request.speed),
        };

        let response = self
            .client
            .audio()
            .speech(speech_request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    request_bytes = request.body.len(),
                    "OpenAI TTS API call failed"
                );
                SynthesisError::backend(PROVIDER, e.to_string())
            })?;

        let audio = response.bytes.to_vec();
        tracing::debug!(
            provider = PROVIDER,
            audio_size = audio.len(),
            "OpenAI TTS audio received"
        );

        Ok(BackendAudio { audio, marks: None })
    }
}
