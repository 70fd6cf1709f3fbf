use async_trait::async_trait;
use lessonaudio::domain::synthesis::SynthesisError;
use lessonaudio::infrastructure::audio::{AudioToolkit, AudioToolkitError};
use lessonaudio::infrastructure::backends::{
    BackendAudio, BackendCapabilities, MarkOffset, SynthesisBackend, SynthesisRequest,
};
use lessonaudio::infrastructure::storage::{StorageError, StorageRepository};
use std::sync::Mutex;

/// Milliseconds one synthesized unit occupies in mock audio (speech plus the
/// fixed inter-unit break).
pub const MOCK_UNIT_MS: u64 = 400;

/// Extra padding the mock backend appends when the trailing break directive
/// is present, mirroring the real utterance-end padding.
pub const MOCK_TRAILING_PAD_MS: u64 = 300;

/// Mock audio is just its own duration, printable for debugging:
/// `AUDIO:<ms>`.
pub fn encode_audio(ms: u64) -> Vec<u8> {
    format!("AUDIO:{ms}").into_bytes()
}

pub fn decode_audio(audio: &[u8]) -> u64 {
    let text = std::str::from_utf8(audio).expect("mock audio is utf-8");
    text.strip_prefix("AUDIO:")
        .expect("mock audio prefix")
        .parse()
        .expect("mock audio duration")
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedCall {
    pub body: String,
    pub voice_id: String,
    pub speed: f32,
}

/// Configurable fake backend. Mark-capable configurations report one mark per
/// `<mark .../>` tag in the request body, spaced [`MOCK_UNIT_MS`] apart.
pub struct MockSynthesisBackend {
    provider: &'static str,
    capabilities: BackendCapabilities,
    /// When set, only the first N marks are reported, simulating an
    /// incomplete timing report.
    mark_limit: Option<usize>,
    /// When false, a mark-capable backend still returns no timing signal.
    emit_marks: bool,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockSynthesisBackend {
    pub fn cloud_marks() -> Self {
        Self {
            provider: "mock-cloud",
            capabilities: BackendCapabilities {
                supports_inline_marks: true,
                supports_post_hoc_marks: false,
                supports_control_tokens: false,
            },
            mark_limit: None,
            emit_marks: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn speech_marks() -> Self {
        Self {
            provider: "mock-speech",
            capabilities: BackendCapabilities {
                supports_inline_marks: false,
                supports_post_hoc_marks: true,
                supports_control_tokens: false,
            },
            mark_limit: None,
            emit_marks: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn markless() -> Self {
        Self {
            provider: "mock-markless",
            capabilities: BackendCapabilities {
                supports_inline_marks: false,
                supports_post_hoc_marks: false,
                supports_control_tokens: true,
            },
            mark_limit: None,
            emit_marks: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_marks(mut self) -> Self {
        self.emit_marks = false;
        self
    }

    pub fn with_mark_limit(mut self, limit: usize) -> Self {
        self.mark_limit = Some(limit);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn mark_names(body: &str) -> Vec<String> {
        let pattern = regex::Regex::new(r#"<mark name="([^"]+)"/>"#).unwrap();
        pattern
            .captures_iter(body)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

#[async_trait]
impl SynthesisBackend for MockSynthesisBackend {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<BackendAudio, SynthesisError> {
        self.calls.lock().unwrap().push(RecordedCall {
            body: request.body.clone(),
            voice_id: request.voice_id.clone(),
            speed: request.speed,
        });

        let mark_names = Self::mark_names(&request.body);
        let unit_count = mark_names.len().max(1);
        let mut duration_ms = unit_count as u64 * MOCK_UNIT_MS;
        if request.body.contains("(pause)") {
            duration_ms += MOCK_TRAILING_PAD_MS;
        }

        let marks = if self.capabilities.has_timing_signal() && self.emit_marks {
            let limit = self.mark_limit.unwrap_or(mark_names.len());
            Some(
                mark_names
                    .into_iter()
                    .take(limit)
                    .enumerate()
                    .map(|(position, mark_name)| MarkOffset {
                        mark_name,
                        offset_ms: position as u64 * MOCK_UNIT_MS,
                    })
                    .collect(),
            )
        } else {
            None
        };

        Ok(BackendAudio {
            audio: encode_audio(duration_ms),
            marks,
        })
    }
}

/// Fake toolkit over the `AUDIO:<ms>` encoding: durations add under concat,
/// subtract under slice, and silence is its requested length.
#[derive(Default)]
pub struct MockAudioToolkit {
    pub silence_calls: Mutex<Vec<f32>>,
    pub concat_calls: Mutex<usize>,
}

impl MockAudioToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn silence_call_count(&self) -> usize {
        self.silence_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioToolkit for MockAudioToolkit {
    async fn concat(&self, segments: &[Vec<u8>]) -> Result<Vec<u8>, AudioToolkitError> {
        *self.concat_calls.lock().unwrap() += 1;
        let total: u64 = segments.iter().map(|segment| decode_audio(segment)).sum();
        Ok(encode_audio(total))
    }

    async fn duration_ms(&self, audio: &[u8]) -> Result<u64, AudioToolkitError> {
        Ok(decode_audio(audio))
    }

    async fn slice(
        &self,
        audio: &[u8],
        start_ms: u64,
        end_ms: Option<u64>,
    ) -> Result<Vec<u8>, AudioToolkitError> {
        let total = decode_audio(audio);
        let end = end_ms.unwrap_or(total);
        Ok(encode_audio(end.saturating_sub(start_ms)))
    }

    async fn generate_silence(&self, seconds: f32) -> Result<Vec<u8>, AudioToolkitError> {
        self.silence_calls.lock().unwrap().push(seconds);
        Ok(encode_audio((seconds * 1000.0).round() as u64))
    }

    async fn trim_trailing_silence(&self, audio: &[u8]) -> Result<Vec<u8>, AudioToolkitError> {
        let total = decode_audio(audio);
        Ok(encode_audio(total.saturating_sub(MOCK_TRAILING_PAD_MS)))
    }
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedUpload {
    pub filename: String,
    pub content_type: String,
    pub folder: String,
    pub size_bytes: usize,
}

/// In-memory storage that fabricates CDN-style URLs.
#[derive(Default)]
pub struct MockStorageRepository {
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

impl MockStorageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploaded_filenames(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|upload| upload.filename.clone())
            .collect()
    }
}

#[async_trait]
impl StorageRepository for MockStorageRepository {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            folder: folder.to_string(),
            size_bytes: bytes.len(),
        });
        Ok(format!("https://cdn.example.com/{folder}/{filename}"))
    }
}
