pub mod normalizer;
pub mod overrides;

pub use normalizer::{is_kanji_bearing, PronunciationNormalizer};
pub use overrides::PronunciationOverrides;
