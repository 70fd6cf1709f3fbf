use super::error::AssemblyError;
use super::timing::{SegmentArtifact, SpeedVariant, TimingEntry};
use crate::domain::batching::PauseIndex;
use crate::domain::synthesis::UnitAudio;
use crate::infrastructure::audio::AudioToolkit;
use crate::infrastructure::storage::StorageRepository;
use std::collections::HashMap;
use std::sync::Arc;

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Stitches per-unit audio and pause silence into one continuous stream per
/// playback speed, computing the cumulative timing map as it goes.
///
/// Assembly is strictly sequential within one speed variant because timing
/// offsets accumulate in order.
pub struct AudioAssembler {
    toolkit: Arc<dyn AudioToolkit>,
    storage: Arc<dyn StorageRepository>,
    upload_segments: bool,
}

struct AssemblySegment {
    original_index: usize,
    audio: Vec<u8>,
    is_pause: bool,
}

impl AudioAssembler {
    pub fn new(
        toolkit: Arc<dyn AudioToolkit>,
        storage: Arc<dyn StorageRepository>,
        upload_segments: bool,
    ) -> Self {
        Self {
            toolkit,
            storage,
            upload_segments,
        }
    }

    /// Assemble one speed variant from per-unit audio (in `original_index`
    /// order) and the pause table. Uploads the combined stream and, when
    /// enabled, each text unit's individual segment.
    pub async fn assemble(
        &self,
        units: &[UnitAudio],
        pause_indices: &PauseIndex,
        speed_key: &str,
        version: &str,
        folder: &str,
    ) -> Result<SpeedVariant, AssemblyError> {
        let segments = self.build_segment_list(units, pause_indices).await?;

        let ordered_audio: Vec<Vec<u8>> = segments
            .iter()
            .map(|segment| segment.audio.clone())
            .collect();
        let combined = self.toolkit.concat(&ordered_audio).await?;

        // The timing map walks the exact segment list that was concatenated;
        // each start is the running sum of probed durations.
        let mut timings = Vec::with_capacity(segments.len());
        let mut cursor_ms: u64 = 0;
        for segment in &segments {
            let duration = self.toolkit.duration_ms(&segment.audio).await?;
            timings.push(TimingEntry {
                original_index: segment.original_index,
                start_ms: cursor_ms,
                end_ms: cursor_ms + duration,
            });
            cursor_ms += duration;
        }

        let filename = format!("lesson_{version}_{speed_key}.mp3");
        let url = self
            .storage
            .upload(combined.clone(), &filename, AUDIO_CONTENT_TYPE, folder)
            .await?;

        let mut segment_artifacts = Vec::new();
        if self.upload_segments {
            for segment in &segments {
                if segment.is_pause {
                    continue;
                }
                let segment_filename = format!(
                    "lesson_{version}_u{}_{speed_key}.mp3",
                    segment.original_index
                );
                let segment_url = self
                    .storage
                    .upload(
                        segment.audio.clone(),
                        &segment_filename,
                        AUDIO_CONTENT_TYPE,
                        folder,
                    )
                    .await?;
                segment_artifacts.push(SegmentArtifact {
                    original_index: segment.original_index,
                    url: segment_url,
                });
            }
        }

        tracing::info!(
            speed_key = speed_key,
            segment_count = segments.len(),
            total_duration_ms = cursor_ms,
            combined_size_bytes = combined.len(),
            uploaded_segments = segment_artifacts.len(),
            "Speed variant assembled"
        );

        Ok(SpeedVariant {
            url,
            timings,
            segments: segment_artifacts,
        })
    }

    /// Interleave unit audio with silence sized per the pause table. Silence
    /// is inserted immediately before the unit at the recorded output
    /// position; trailing entries append at the end. One silence buffer is
    /// generated per distinct duration and reused.
    async fn build_segment_list(
        &self,
        units: &[UnitAudio],
        pause_indices: &PauseIndex,
    ) -> Result<Vec<AssemblySegment>, AssemblyError> {
        let mut silence_cache: HashMap<u64, Vec<u8>> = HashMap::new();
        let mut segments = Vec::with_capacity(units.len() + pause_indices.len());

        for (position, unit) in units.iter().enumerate() {
            if let Some(entry) = pause_indices.get(&position) {
                let audio = self
                    .silence_for(entry.seconds, &mut silence_cache)
                    .await?;
                segments.push(AssemblySegment {
                    original_index: entry.original_index,
                    audio,
                    is_pause: true,
                });
            }
            segments.push(AssemblySegment {
                original_index: unit.original_index,
                audio: unit.audio.clone(),
                is_pause: false,
            });
        }

        for (_, entry) in pause_indices.range(units.len()..) {
            let audio = self
                .silence_for(entry.seconds, &mut silence_cache)
                .await?;
            segments.push(AssemblySegment {
                original_index: entry.original_index,
                audio,
                is_pause: true,
            });
        }

        Ok(segments)
    }

    async fn silence_for(
        &self,
        seconds: f32,
        cache: &mut HashMap<u64, Vec<u8>>,
    ) -> Result<Vec<u8>, AssemblyError> {
        let key_ms = (seconds * 1000.0).round() as u64;
        if let Some(cached) = cache.get(&key_ms) {
            return Ok(cached.clone());
        }
        let silence = self.toolkit.generate_silence(seconds).await?;
        cache.insert(key_ms, silence.clone());
        Ok(silence)
    }
}
