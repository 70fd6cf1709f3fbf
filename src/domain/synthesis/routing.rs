use crate::domain::markup::MarkupDialect;

/// The three backend families the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    /// Mark-capable cloud backend: inline SSML marks with time points.
    CloudMarks,
    /// Post-hoc speech-mark backend: audio and a separate mark report.
    SpeechMarks,
    /// No timing signal at all; batches degrade to per-unit calls.
    Markless,
}

/// Prefix carried by voice identifiers of the mark-less provider.
pub const MARKLESS_VOICE_PREFIX: &str = "openai:";

/// Select a backend family from the voice identifier alone. Pure function of
/// the identifier pattern, no configuration lookup:
///
/// - an explicit provider prefix routes to the mark-less backend;
/// - a hyphenated locale pattern (`ja-JP-Neural2-B`) routes to the
///   mark-capable cloud backend;
/// - short alphabetic identifiers (`Takumi`, `Joanna`) route to the
///   speech-mark backend, which is also the fallback for anything else.
pub fn route_voice(voice_id: &str) -> BackendFamily {
    if voice_id.starts_with(MARKLESS_VOICE_PREFIX) {
        return BackendFamily::Markless;
    }
    let locale = regex::Regex::new(r"^[a-z]{2,3}-[A-Z]{2}-").unwrap();
    if locale.is_match(voice_id) {
        return BackendFamily::CloudMarks;
    }
    BackendFamily::SpeechMarks
}

/// The markup dialect each family consumes.
pub fn dialect_for(family: BackendFamily) -> MarkupDialect {
    match family {
        BackendFamily::CloudMarks => MarkupDialect::InlineMarks,
        BackendFamily::SpeechMarks => MarkupDialect::ProsodyMarks,
        BackendFamily::Markless => MarkupDialect::PlainText,
    }
}

/// Convenience for callers that only have the voice identifier.
pub fn dialect_for_voice(voice_id: &str) -> MarkupDialect {
    dialect_for(route_voice(voice_id))
}
