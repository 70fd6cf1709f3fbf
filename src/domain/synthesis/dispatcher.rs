use super::error::SynthesisError;
use super::routing::{self, BackendFamily};
use crate::domain::batching::Batch;
use crate::domain::markup::{self, MarkupDialect};
use crate::infrastructure::audio::AudioToolkit;
use crate::infrastructure::backends::{MarkOffset, SynthesisBackend, SynthesisRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// One unit's audio after batch boundaries have been reconstructed.
#[derive(Debug, Clone)]
pub struct UnitAudio {
    pub original_index: usize,
    pub audio: Vec<u8>,
}

/// Routes each batch to a backend by voice identifier, invokes it, and cuts
/// the returned audio back into per-unit segments using whatever timing
/// signal the backend provides. Falls back to one call per unit when no
/// signal is available; correctness takes precedence over the batching
/// optimization on that path.
pub struct SynthesisDispatcher {
    cloud_marks: Arc<dyn SynthesisBackend>,
    speech_marks: Arc<dyn SynthesisBackend>,
    markless: Arc<dyn SynthesisBackend>,
    toolkit: Arc<dyn AudioToolkit>,
}

impl SynthesisDispatcher {
    pub fn new(
        cloud_marks: Arc<dyn SynthesisBackend>,
        speech_marks: Arc<dyn SynthesisBackend>,
        markless: Arc<dyn SynthesisBackend>,
        toolkit: Arc<dyn AudioToolkit>,
    ) -> Self {
        Self {
            cloud_marks,
            speech_marks,
            markless,
            toolkit,
        }
    }

    fn backend_for(&self, family: BackendFamily) -> &Arc<dyn SynthesisBackend> {
        match family {
            BackendFamily::CloudMarks => &self.cloud_marks,
            BackendFamily::SpeechMarks => &self.speech_marks,
            BackendFamily::Markless => &self.markless,
        }
    }

    /// Synthesize one batch at the given playback speed and return per-unit
    /// audio in batch order. `append_trailing_break` applies only to the
    /// final batch routed to the mark-less backend.
    pub async fn dispatch_batch(
        &self,
        batch: &Batch,
        playback_speed: f32,
        append_trailing_break: bool,
    ) -> Result<Vec<UnitAudio>, SynthesisError> {
        let family = routing::route_voice(&batch.voice_id);
        let backend = self.backend_for(family);
        let dialect = routing::dialect_for(family);

        if !backend.capabilities().has_timing_signal() {
            return self
                .synthesize_per_unit(batch, backend, dialect, playback_speed, append_trailing_break)
                .await;
        }

        let body = markup::render(batch, dialect, playback_speed);
        let request = SynthesisRequest {
            body,
            voice_id: batch.voice_id.clone(),
            language_code: batch.language_code.clone(),
            speed: batch.speed * playback_speed,
            pitch: batch.pitch,
        };

        tracing::info!(
            provider = backend.provider(),
            voice_id = %batch.voice_id,
            request_bytes = request.body.len(),
            unit_count = batch.unit_count(),
            playback_speed = playback_speed,
            "Dispatching batch"
        );

        let result = backend.synthesize(&request).await?;

        match result.marks {
            Some(marks) => {
                self.cut_batch_audio(batch, result.audio, &marks, backend, dialect, playback_speed)
                    .await
            }
            None => {
                tracing::warn!(
                    provider = backend.provider(),
                    voice_id = %batch.voice_id,
                    unit_count = batch.unit_count(),
                    "Backend returned no timing signal, resynthesizing per unit"
                );
                self.synthesize_per_unit(batch, backend, dialect, playback_speed, false)
                    .await
            }
        }
    }

    /// Cut batched audio into per-unit segments at mark offsets. Each unit
    /// spans from its own mark to the next unit's mark; the last unit runs to
    /// the end of the stream. An incomplete mark report degrades to the
    /// per-unit path rather than guessing boundaries.
    async fn cut_batch_audio(
        &self,
        batch: &Batch,
        audio: Vec<u8>,
        marks: &[MarkOffset],
        backend: &Arc<dyn SynthesisBackend>,
        dialect: MarkupDialect,
        playback_speed: f32,
    ) -> Result<Vec<UnitAudio>, SynthesisError> {
        let offsets: HashMap<&str, u64> = marks
            .iter()
            .map(|mark| (mark.mark_name.as_str(), mark.offset_ms))
            .collect();

        let starts: Option<Vec<u64>> = batch
            .units
            .iter()
            .map(|unit| offsets.get(unit.mark_name.as_str()).copied())
            .collect();
        let Some(starts) = starts else {
            tracing::warn!(
                provider = backend.provider(),
                voice_id = %batch.voice_id,
                mark_count = marks.len(),
                unit_count = batch.unit_count(),
                "Mark report is missing units, resynthesizing per unit"
            );
            return self
                .synthesize_per_unit(batch, backend, dialect, playback_speed, false)
                .await;
        };

        let mut units = Vec::with_capacity(batch.unit_count());
        for (position, unit) in batch.units.iter().enumerate() {
            let start_ms = starts[position];
            let end_ms = starts.get(position + 1).copied();
            let segment = self.toolkit.slice(&audio, start_ms, end_ms).await?;
            units.push(UnitAudio {
                original_index: unit.original_index,
                audio: segment,
            });
        }
        Ok(units)
    }

    /// One backend call per unit. Used for the mark-less family and as the
    /// fallback when a mark-capable backend fails to report boundaries.
    async fn synthesize_per_unit(
        &self,
        batch: &Batch,
        backend: &Arc<dyn SynthesisBackend>,
        dialect: MarkupDialect,
        playback_speed: f32,
        append_trailing_break: bool,
    ) -> Result<Vec<UnitAudio>, SynthesisError> {
        let mut units = Vec::with_capacity(batch.unit_count());
        let last_position = batch.unit_count().saturating_sub(1);

        for (position, unit) in batch.units.iter().enumerate() {
            let trailing = append_trailing_break && position == last_position;
            let body = match dialect {
                MarkupDialect::PlainText => {
                    if markup::contains_control_token(&unit.text) {
                        tracing::debug!(
                            original_index = unit.original_index,
                            "Control tokens present in unit text"
                        );
                    }
                    markup::render_plain_unit(&unit.text, trailing)
                }
                _ => {
                    let single = Batch {
                        units: vec![unit.clone()],
                        ..batch.clone()
                    };
                    markup::render(&single, dialect, playback_speed)
                }
            };

            let request = SynthesisRequest {
                body,
                voice_id: batch.voice_id.clone(),
                language_code: batch.language_code.clone(),
                speed: batch.speed * playback_speed,
                pitch: batch.pitch,
            };

            tracing::info!(
                provider = backend.provider(),
                voice_id = %batch.voice_id,
                request_bytes = request.body.len(),
                unit_count = 1,
                playback_speed = playback_speed,
                "Dispatching single unit"
            );

            let result = backend.synthesize(&request).await?;
            let audio = if trailing {
                // The trailing break directive padded the utterance end; trim
                // it back off so the segment ends where the speech does.
                self.toolkit.trim_trailing_silence(&result.audio).await?
            } else {
                result.audio
            };

            units.push(UnitAudio {
                original_index: unit.original_index,
                audio,
            });
        }

        Ok(units)
    }
}
