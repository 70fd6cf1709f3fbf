use serde::{Deserialize, Serialize};

/// One atomic item of a lesson script, as produced by the content-generation
/// stage. Units are immutable inputs; `original_index` identifies the unit
/// through every later stage so the assembler can reattach timing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptUnit {
    pub original_index: usize,
    #[serde(flatten)]
    pub payload: UnitPayload,
}

/// The four unit kinds. Pauses and markers carry no voice; markers are
/// non-audible and used only for structural bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitPayload {
    TargetText(TextUnit),
    NativeNarration(TextUnit),
    Pause { seconds: f32 },
    Marker { name: String },
}

/// Shared fields of the two audible text kinds.
///
/// `reading` holds bracketed ruby notation (`漢字[かんじ]` style) for
/// target-language text. `speed` is a playback ratio (1.0 = normal) and
/// `pitch` a semitone offset; both are optional on the wire and defaulted
/// during grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    pub display_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default)]
    pub pitch: f32,
}

impl ScriptUnit {
    pub fn target(original_index: usize, display_text: &str, voice_id: &str) -> Self {
        Self {
            original_index,
            payload: UnitPayload::TargetText(TextUnit {
                display_text: display_text.to_string(),
                reading: None,
                voice_id: Some(voice_id.to_string()),
                speed: None,
                pitch: 0.0,
            }),
        }
    }

    pub fn narration(original_index: usize, display_text: &str, voice_id: &str) -> Self {
        Self {
            original_index,
            payload: UnitPayload::NativeNarration(TextUnit {
                display_text: display_text.to_string(),
                reading: None,
                voice_id: Some(voice_id.to_string()),
                speed: None,
                pitch: 0.0,
            }),
        }
    }

    pub fn pause(original_index: usize, seconds: f32) -> Self {
        Self {
            original_index,
            payload: UnitPayload::Pause { seconds },
        }
    }

    pub fn marker(original_index: usize, name: &str) -> Self {
        Self {
            original_index,
            payload: UnitPayload::Marker {
                name: name.to_string(),
            },
        }
    }

    /// Builder-style helper for attaching a bracketed reading to a text unit.
    pub fn with_reading(mut self, reading: &str) -> Self {
        if let UnitPayload::TargetText(ref mut text) | UnitPayload::NativeNarration(ref mut text) =
            self.payload
        {
            text.reading = Some(reading.to_string());
        }
        self
    }

    /// Builder-style helper for an explicit per-unit speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        if let UnitPayload::TargetText(ref mut text) | UnitPayload::NativeNarration(ref mut text) =
            self.payload
        {
            text.speed = Some(speed);
        }
        self
    }

    /// Builder-style helper for an explicit per-unit pitch.
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        if let UnitPayload::TargetText(ref mut text) | UnitPayload::NativeNarration(ref mut text) =
            self.payload
        {
            text.pitch = pitch;
        }
        self
    }
}

/// Which of the two audible kinds a normalized unit came from. Decides which
/// language code the grouper assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Target,
    Narration,
}

/// A text unit after pronunciation normalization: `text` is the
/// synthesis-ready string, distinct from the `display_text` shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub original_index: usize,
    pub kind: TextKind,
    pub display_text: String,
    pub text: String,
    pub voice_id: Option<String>,
    pub speed: Option<f32>,
    pub pitch: f32,
}

/// Output of the pronunciation stage. Pauses and markers pass through
/// untouched so the grouper can extract them out-of-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizedUnit {
    Text(NormalizedText),
    Pause { original_index: usize, seconds: f32 },
    Marker { original_index: usize, name: String },
}
