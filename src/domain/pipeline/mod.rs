pub mod service;

pub use service::{AudioPipelineService, SPEED_VARIANTS};

use crate::domain::assembly::SpeedVariant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Final pipeline output: one combined artifact per playback speed plus the
/// timing map for each, keyed by the `0_7` / `0_85` / `1_0` naming
/// convention. `combined_audio_url` is the normal-speed variant's URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledAudio {
    pub combined_audio_url: String,
    pub per_speed: HashMap<String, SpeedVariant>,
}
