pub mod grouper;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use grouper::BatchGrouper;

/// One unit inside a batch: the text sent to synthesis plus the named mark
/// used to recover its start offset from the returned audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUnit {
    pub original_index: usize,
    pub mark_name: String,
    pub text: String,
}

/// A maximal contiguous run of normalized units sharing
/// `(voice_id, speed, language_code)`, synthesized in a single backend call.
///
/// Invariant: voice, speed and language are constant within a batch; adjacent
/// batches differ in at least one of the three unless a size limit forced a
/// split. Pauses never appear inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub voice_id: String,
    pub speed: f32,
    pub pitch: f32,
    pub language_code: String,
    pub units: Vec<BatchUnit>,
}

impl Batch {
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

/// A pause extracted out-of-band during grouping. Keyed in [`PauseIndex`] by
/// the output position of the text unit that follows it; consecutive pauses
/// accumulate into one entry. The pause unit's `original_index` is kept so the
/// assembler can emit a timing entry for the gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseEntry {
    pub seconds: f32,
    pub original_index: usize,
}

/// Position in the flattened text-unit output sequence -> pause duration.
/// Independent of batch boundaries. A `BTreeMap` keeps iteration order
/// deterministic.
pub type PauseIndex = BTreeMap<usize, PauseEntry>;

/// Grouper output: ordered batches plus the out-of-band pause table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedScript {
    pub batches: Vec<Batch>,
    pub pause_indices: PauseIndex,
}

impl GroupedScript {
    /// All batch units flattened back into output order.
    pub fn flattened_units(&self) -> impl Iterator<Item = &BatchUnit> {
        self.batches.iter().flat_map(|batch| batch.units.iter())
    }

    pub fn text_unit_count(&self) -> usize {
        self.batches.iter().map(Batch::unit_count).sum()
    }
}
