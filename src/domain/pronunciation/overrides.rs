use std::collections::HashSet;

/// Static pronunciation override tables, loaded once at startup and passed
/// explicitly into the normalizer so tests can inject alternate sets.
///
/// `keep_kanji` entries are spoken from their logographic form even when a
/// bracketed reading is attached. `force_kana` entries are always fully
/// converted to their phonetic reading, bracket notation or not.
#[derive(Debug, Clone, Default)]
pub struct PronunciationOverrides {
    keep_kanji: HashSet<String>,
    force_kana: HashSet<String>,
}

impl PronunciationOverrides {
    pub fn new<I, J>(keep_kanji: I, force_kana: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            keep_kanji: keep_kanji.into_iter().collect(),
            force_kana: force_kana.into_iter().collect(),
        }
    }

    /// The curated production tables. Kept small on purpose: entries are added
    /// when a voice is observed mispronouncing a word, not preemptively.
    pub fn defaults() -> Self {
        let keep_kanji = ["今日", "明日", "一人", "二人", "大人", "橋", "上手", "下手"];
        let force_kana = ["辛い", "頁", "台詞", "流石", "相応しい"];
        Self::new(
            keep_kanji.iter().map(|w| (*w).to_string()),
            force_kana.iter().map(|w| (*w).to_string()),
        )
    }

    pub fn keeps_kanji(&self, word: &str) -> bool {
        self.keep_kanji.contains(word)
    }

    pub fn forces_kana(&self, word: &str) -> bool {
        self.force_kana.contains(word)
    }
}
