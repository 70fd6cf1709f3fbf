use super::overrides::PronunciationOverrides;
use crate::domain::script::{NormalizedText, NormalizedUnit, ScriptUnit, TextKind, UnitPayload};

/// Whether a language code refers to the kanji-bearing target language.
/// Reading resolution only applies there; every other language is passed to
/// synthesis exactly as displayed.
pub fn is_kanji_bearing(language_code: &str) -> bool {
    language_code.starts_with("ja")
}

/// Rewrites display text into the text actually sent to synthesis.
///
/// Pure: no network or state access. The override tables are injected at
/// construction so tests can swap them.
pub struct PronunciationNormalizer {
    overrides: PronunciationOverrides,
}

impl PronunciationNormalizer {
    pub fn new(overrides: PronunciationOverrides) -> Self {
        Self { overrides }
    }

    /// Normalize a full unit sequence. Pauses and markers pass through
    /// untouched; narration units keep their display text verbatim.
    pub fn normalize_units(
        &self,
        units: &[ScriptUnit],
        target_language: &str,
    ) -> Vec<NormalizedUnit> {
        units
            .iter()
            .map(|unit| self.normalize_unit(unit, target_language))
            .collect()
    }

    fn normalize_unit(&self, unit: &ScriptUnit, target_language: &str) -> NormalizedUnit {
        match &unit.payload {
            UnitPayload::TargetText(text) => {
                let synthesis_text = if is_kanji_bearing(target_language) {
                    self.resolve_reading(&text.display_text, text.reading.as_deref())
                } else {
                    text.display_text.clone()
                };
                NormalizedUnit::Text(NormalizedText {
                    original_index: unit.original_index,
                    kind: TextKind::Target,
                    display_text: text.display_text.clone(),
                    text: synthesis_text,
                    voice_id: text.voice_id.clone(),
                    speed: text.speed,
                    pitch: text.pitch,
                })
            }
            UnitPayload::NativeNarration(text) => NormalizedUnit::Text(NormalizedText {
                original_index: unit.original_index,
                kind: TextKind::Narration,
                display_text: text.display_text.clone(),
                text: text.display_text.clone(),
                voice_id: text.voice_id.clone(),
                speed: text.speed,
                pitch: text.pitch,
            }),
            UnitPayload::Pause { seconds } => NormalizedUnit::Pause {
                original_index: unit.original_index,
                seconds: *seconds,
            },
            UnitPayload::Marker { name } => NormalizedUnit::Marker {
                original_index: unit.original_index,
                name: name.clone(),
            },
        }
    }

    /// Resolve bracketed ruby notation (`漢字[かんじ]` style) into the spoken
    /// form. Runs with no bracket pass through unchanged, as do unknown
    /// characters.
    pub fn resolve_reading(&self, display_text: &str, reading: Option<&str>) -> String {
        let source = reading.unwrap_or(display_text);

        let annotated = regex::Regex::new(r"([\p{Han}々〆ヶ]+)\[([^\]]*)\]").unwrap();
        let bracket = regex::Regex::new(r"\[[^\]]*\]").unwrap();

        // The bare word, bracket notation stripped, is what the override
        // tables are keyed on.
        let bare_word = bracket.replace_all(source, "").to_string();

        if self.overrides.forces_kana(&bare_word) {
            // Fully phonetic: every annotated kanji run becomes its reading,
            // keep-kanji entries included.
            return annotated.replace_all(source, "$2").to_string();
        }

        annotated
            .replace_all(source, |caps: &regex::Captures| {
                let kanji_run = &caps[1];
                if self.overrides.keeps_kanji(kanji_run) {
                    kanji_run.to_string()
                } else {
                    caps[2].to_string()
                }
            })
            .to_string()
    }
}
