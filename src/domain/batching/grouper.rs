use super::{Batch, BatchUnit, GroupedScript, PauseEntry, PauseIndex};
use crate::domain::markup;
use crate::domain::script::{NormalizedUnit, TextKind};
use crate::domain::synthesis::routing;

/// Rendered-markup byte ceiling per request, matching common cloud TTS
/// request limits.
pub const MAX_REQUEST_BYTES: usize = 4800;

/// Substituted when a text unit carries no explicit speed.
pub const DEFAULT_SPEED: f32 = 1.0;

/// Partitions a normalized unit sequence into maximal `(voice, speed,
/// language)` runs, extracting pauses out-of-band and dropping markers.
///
/// Grouping is deterministic: identical input yields byte-identical batch
/// boundaries and pause indices.
pub struct BatchGrouper {
    max_request_bytes: usize,
}

impl Default for BatchGrouper {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchGrouper {
    pub fn new() -> Self {
        Self {
            max_request_bytes: MAX_REQUEST_BYTES,
        }
    }

    /// Override the byte ceiling. Used by tests; production keeps
    /// [`MAX_REQUEST_BYTES`].
    pub fn with_max_request_bytes(max_request_bytes: usize) -> Self {
        Self { max_request_bytes }
    }

    pub fn group(
        &self,
        units: &[NormalizedUnit],
        native_language: &str,
        target_language: &str,
    ) -> GroupedScript {
        let mut batches: Vec<Batch> = Vec::new();
        let mut current: Option<Batch> = None;
        let mut pause_indices: PauseIndex = PauseIndex::new();
        let mut output_length: usize = 0;

        for unit in units {
            match unit {
                NormalizedUnit::Marker { original_index, name } => {
                    tracing::debug!(
                        original_index = original_index,
                        marker = %name,
                        "Dropping structural marker"
                    );
                }
                NormalizedUnit::Pause {
                    original_index,
                    seconds,
                } => {
                    // Pauses do not terminate the current batch. The key is
                    // the output position of the next text unit; back-to-back
                    // pauses accumulate.
                    pause_indices
                        .entry(output_length)
                        .and_modify(|entry| entry.seconds += seconds)
                        .or_insert(PauseEntry {
                            seconds: *seconds,
                            original_index: *original_index,
                        });
                }
                NormalizedUnit::Text(text) => {
                    let language_code = match text.kind {
                        TextKind::Narration => native_language,
                        TextKind::Target => target_language,
                    };
                    let voice_id = text.voice_id.clone().unwrap_or_default();
                    if text.voice_id.is_none() {
                        tracing::warn!(
                            original_index = text.original_index,
                            "Text unit has no voice id, grouping it separately"
                        );
                    }
                    let speed = text.speed.unwrap_or(DEFAULT_SPEED);

                    let batch_unit = BatchUnit {
                        original_index: text.original_index,
                        mark_name: format!("u{}", text.original_index),
                        text: text.text.clone(),
                    };

                    match current.as_mut() {
                        Some(batch)
                            if batch.voice_id == voice_id
                                && batch.speed == speed
                                && batch.language_code == language_code =>
                        {
                            batch.units.push(batch_unit);
                        }
                        _ => {
                            if let Some(finished) = current.take() {
                                batches.push(finished);
                            }
                            current = Some(Batch {
                                voice_id,
                                speed,
                                pitch: text.pitch,
                                language_code: language_code.to_string(),
                                units: vec![batch_unit],
                            });
                        }
                    }
                    output_length += 1;
                }
            }
        }

        if let Some(finished) = current.take() {
            batches.push(finished);
        }

        let batches: Vec<Batch> = batches
            .into_iter()
            .flat_map(|batch| self.split_oversized(batch))
            .collect();

        tracing::info!(
            batch_count = batches.len(),
            text_unit_count = output_length,
            pause_count = pause_indices.len(),
            "Units grouped into batches"
        );

        GroupedScript {
            batches,
            pause_indices,
        }
    }

    /// Greedy forward-fill split for batches whose rendered markup would
    /// exceed the byte ceiling. Preserves original order and all batch
    /// metadata; never rebalances.
    fn split_oversized(&self, batch: Batch) -> Vec<Batch> {
        let dialect = routing::dialect_for_voice(&batch.voice_id);
        if markup::render(&batch, dialect, 1.0).len() <= self.max_request_bytes {
            return vec![batch];
        }

        tracing::info!(
            voice_id = %batch.voice_id,
            unit_count = batch.unit_count(),
            max_request_bytes = self.max_request_bytes,
            "Splitting oversized batch"
        );

        let template = Batch {
            units: Vec::new(),
            ..batch.clone()
        };
        let mut splits: Vec<Batch> = Vec::new();
        let mut current = template.clone();

        for unit in batch.units {
            current.units.push(unit);
            if markup::render(&current, dialect, 1.0).len() > self.max_request_bytes {
                if current.units.len() == 1 {
                    // A single unit over the ceiling cannot be split further;
                    // send it alone and let the backend reject it if it must.
                    tracing::warn!(
                        original_index = current.units[0].original_index,
                        "Single unit exceeds request byte ceiling"
                    );
                    splits.push(std::mem::replace(&mut current, template.clone()));
                } else if let Some(overflow) = current.units.pop() {
                    splits.push(std::mem::replace(&mut current, template.clone()));
                    current.units.push(overflow);
                }
            }
        }
        if !current.units.is_empty() {
            splits.push(current);
        }

        splits
    }
}
