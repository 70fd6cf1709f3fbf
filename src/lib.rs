//! Batched speech-synthesis orchestration and audio assembly for language
//! lessons.
//!
//! The crate is a library invoked by a job worker: it consumes a lesson's
//! script-unit sequence plus synthesis/storage interfaces and produces timed
//! audio artifacts at multiple playback speeds. It owns no network API or CLI.
//!
//! Pipeline stages, each depending only on the one before it:
//!
//! 1. pronunciation normalization (reading resolution and overrides)
//! 2. batch grouping (maximal same-voice runs, pauses extracted out-of-band)
//! 3. request building (per-backend markup dialects)
//! 4. synthesis dispatch (routing, timing-signal recovery, fallback)
//! 5. assembly (silence interleaving, concatenation, cumulative timing map)

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::pipeline::{AssembledAudio, AudioPipelineService};
pub use error::{PipelineError, PipelineResult};
