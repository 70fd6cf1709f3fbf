use super::{BackendAudio, BackendCapabilities, MarkOffset, SynthesisBackend, SynthesisRequest};
use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "google";
const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1beta1/text:synthesize";

/// Google Cloud TTS implementation of the synthesis backend.
///
/// Mark-capable: the request enables SSML time pointing and the response
/// reports one time point per named mark, which is the cheapest timing signal
/// of the three families (audio and marks in a single call).
pub struct GoogleTtsBackend {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleTtsBackend {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the backend at a different endpoint (local fake in tests).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// The synthesis voice name doubles as its locale: `ja-JP-Neural2-B`
    /// belongs to `ja-JP`. The request's language code wins when present.
    fn language_for(request: &SynthesisRequest) -> String {
        if !request.language_code.is_empty() {
            return request.language_code.clone();
        }
        request
            .voice_id
            .splitn(3, '-')
            .take(2)
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: SsmlInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
    enable_time_pointing: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SsmlInput<'a> {
    ssml: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
    #[serde(default)]
    timepoints: Vec<Timepoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Timepoint {
    mark_name: String,
    #[serde(default)]
    time_seconds: f64,
}

#[async_trait]
impl SynthesisBackend for GoogleTtsBackend {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_inline_marks: true,
            supports_post_hoc_marks: false,
            supports_control_tokens: false,
        }
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<BackendAudio, SynthesisError> {
        let language_code = Self::language_for(request);

        tracing::info!(
            provider = PROVIDER,
            voice = %request.voice_id,
            language = %language_code,
            speaking_rate = request.speed,
            pitch = request.pitch,
            request_bytes = request.body.len(),
            "Calling Google TTS synthesize"
        );

        let body = SynthesizeBody {
            input: SsmlInput {
                ssml: &request.body,
            },
            voice: VoiceSelection {
                language_code: &language_code,
                name: &request.voice_id,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: request.speed,
                pitch: request.pitch,
            },
            enable_time_pointing: vec!["SSML_MARK"],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, provider = PROVIDER, "Google TTS request failed");
                SynthesisError::backend(PROVIDER, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = PROVIDER,
                status = %status,
                detail = %detail,
                "Google TTS returned an error status"
            );
            return Err(SynthesisError::backend(
                PROVIDER,
                format!("status {status}: {detail}"),
            ));
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::backend(PROVIDER, format!("invalid response: {e}")))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&parsed.audio_content)
            .map_err(|e| SynthesisError::backend(PROVIDER, format!("invalid audio payload: {e}")))?;

        let marks = parsed
            .timepoints
            .into_iter()
            .map(|point| MarkOffset {
                mark_name: point.mark_name,
                offset_ms: (point.time_seconds * 1000.0).round() as u64,
            })
            .collect();

        tracing::debug!(
            provider = PROVIDER,
            audio_size = audio.len(),
            "Google TTS audio received"
        );

        Ok(BackendAudio {
            audio,
            marks: Some(marks),
        })
    }
}
