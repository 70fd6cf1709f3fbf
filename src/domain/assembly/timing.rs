use serde::{Deserialize, Serialize};

/// Start/end of one segment inside the combined artifact, in milliseconds,
/// for one specific playback speed. Pause gaps carry the pause unit's
/// `original_index`, so entries cover the whole audible stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingEntry {
    pub original_index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// URL of one text unit's individual audio segment, uploaded for per-word
/// playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentArtifact {
    pub original_index: usize,
    pub url: String,
}

/// One assembled playback-speed variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedVariant {
    pub url: String,
    pub timings: Vec<TimingEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SegmentArtifact>,
}
