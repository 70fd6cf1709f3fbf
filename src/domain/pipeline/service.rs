use super::AssembledAudio;
use crate::domain::assembly::{AudioAssembler, SpeedVariant};
use crate::domain::batching::{BatchGrouper, GroupedScript};
use crate::domain::pronunciation::PronunciationNormalizer;
use crate::domain::script::ScriptUnit;
use crate::domain::synthesis::{
    route_voice, BackendFamily, SynthesisDispatcher, SynthesisError, UnitAudio,
};
use crate::error::{PipelineError, PipelineResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// The fixed playback speed set and its file-naming keys.
pub const SPEED_VARIANTS: [(f32, &str); 3] = [(0.7, "0_7"), (0.85, "0_85"), (1.0, "1_0")];

const NORMAL_SPEED_KEY: &str = "1_0";

/// Orchestrates the five pipeline stages for one generation job:
/// normalize, group, dispatch, assemble, persist.
///
/// Dispatch is concurrent across batches and across speed variants, bounded
/// by one shared permit pool so backend rate limits hold regardless of how
/// the work fans out. Results land at known disjoint indices; nothing else is
/// shared between tasks.
pub struct AudioPipelineService {
    normalizer: PronunciationNormalizer,
    grouper: BatchGrouper,
    dispatcher: Arc<SynthesisDispatcher>,
    assembler: Arc<AudioAssembler>,
    folder: String,
    concurrency: Arc<Semaphore>,
}

impl AudioPipelineService {
    pub fn new(
        normalizer: PronunciationNormalizer,
        grouper: BatchGrouper,
        dispatcher: Arc<SynthesisDispatcher>,
        assembler: Arc<AudioAssembler>,
        folder: String,
        synthesis_concurrency: usize,
    ) -> Self {
        Self {
            normalizer,
            grouper,
            dispatcher,
            assembler,
            folder,
            concurrency: Arc::new(Semaphore::new(synthesis_concurrency)),
        }
    }

    /// Run the whole pipeline for one lesson script and return the assembled
    /// artifacts for every playback speed.
    pub async fn generate(
        &self,
        units: &[ScriptUnit],
        native_language: &str,
        target_language: &str,
        version: &str,
    ) -> PipelineResult<AssembledAudio> {
        let job_id = Uuid::new_v4();
        tracing::info!(
            job_id = %job_id,
            unit_count = units.len(),
            native_language = native_language,
            target_language = target_language,
            version = version,
            "Audio generation started"
        );

        let normalized = self.normalizer.normalize_units(units, target_language);
        let grouped = Arc::new(
            self.grouper
                .group(&normalized, native_language, target_language),
        );

        if grouped.text_unit_count() == 0 {
            return Err(PipelineError::InvalidInput(
                "script contains no audible units".to_string(),
            ));
        }

        // The trailing break directive belongs to the last batch routed to
        // the mark-less backend, independent of speed variant.
        let last_markless_batch = grouped
            .batches
            .iter()
            .rposition(|batch| route_voice(&batch.voice_id) == BackendFamily::Markless);

        let mut handles = Vec::with_capacity(SPEED_VARIANTS.len());
        for (playback_speed, speed_key) in SPEED_VARIANTS {
            let dispatcher = self.dispatcher.clone();
            let assembler = self.assembler.clone();
            let grouped = grouped.clone();
            let concurrency = self.concurrency.clone();
            let folder = self.folder.clone();
            let version = version.to_string();
            handles.push(tokio::spawn(async move {
                run_speed_variant(
                    dispatcher,
                    assembler,
                    grouped,
                    concurrency,
                    playback_speed,
                    speed_key,
                    &version,
                    &folder,
                    last_markless_batch,
                )
                .await
            }));
        }

        let mut per_speed: HashMap<String, SpeedVariant> = HashMap::new();
        for ((_, speed_key), handle) in SPEED_VARIANTS.iter().zip(handles) {
            let variant = handle
                .await
                .map_err(|e| PipelineError::Internal(e.to_string()))??;
            per_speed.insert((*speed_key).to_string(), variant);
        }

        let combined_audio_url = per_speed
            .get(NORMAL_SPEED_KEY)
            .map(|variant| variant.url.clone())
            .ok_or_else(|| {
                PipelineError::Internal("normal-speed variant missing from results".to_string())
            })?;

        tracing::info!(
            job_id = %job_id,
            batch_count = grouped.batches.len(),
            speed_variants = per_speed.len(),
            "Audio generation completed"
        );

        Ok(AssembledAudio {
            combined_audio_url,
            per_speed,
        })
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_speed_variant(
    dispatcher: Arc<SynthesisDispatcher>,
    assembler: Arc<AudioAssembler>,
    grouped: Arc<GroupedScript>,
    concurrency: Arc<Semaphore>,
    playback_speed: f32,
    speed_key: &'static str,
    version: &str,
    folder: &str,
    last_markless_batch: Option<usize>,
) -> PipelineResult<SpeedVariant> {
    let mut handles = Vec::with_capacity(grouped.batches.len());
    for (batch_index, batch) in grouped.batches.iter().enumerate() {
        let dispatcher = dispatcher.clone();
        let concurrency = concurrency.clone();
        let batch = batch.clone();
        let append_trailing_break = last_markless_batch == Some(batch_index);
        handles.push(tokio::spawn(async move {
            let _permit = concurrency
                .acquire_owned()
                .await
                .map_err(|e| SynthesisError::Other(anyhow::Error::new(e)))?;
            dispatcher
                .dispatch_batch(&batch, playback_speed, append_trailing_break)
                .await
        }));
    }

    // Awaiting in spawn order keeps units in original order regardless of
    // which call finishes first.
    let mut unit_audio: Vec<UnitAudio> = Vec::new();
    for handle in handles {
        let batch_units = handle
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;
        unit_audio.extend(batch_units);
    }

    tracing::info!(
        speed_key = speed_key,
        unit_count = unit_audio.len(),
        "All batches synthesized, assembling"
    );

    let variant = assembler
        .assemble(
            &unit_audio,
            &grouped.pause_indices,
            speed_key,
            version,
            folder,
        )
        .await?;
    Ok(variant)
}
