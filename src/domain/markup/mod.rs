use crate::domain::batching::Batch;

/// Fixed break inserted after every unit inside a markup request. Gives each
/// segment an audible gap and keeps mark offsets well separated.
pub const INTER_UNIT_BREAK_MS: u32 = 300;

/// Directive words understood by the mark-less backend family. Detected by
/// substring scan; everything else in the vocabulary is spoken literally.
pub const CONTROL_TOKENS: &[&str] = &["(pause)", "(break)", "(breath)", "(sigh)"];

/// Appended after the final unit of the final batch sent to the mark-less
/// backend so trailing-silence trimming can locate the utterance end.
pub const TRAILING_BREAK_TOKEN: &str = "(pause)";

/// The rendering dialect a backend consumes.
///
/// `InlineMarks` is plain SSML with named marks; rate and pitch travel as
/// request parameters. `ProsodyMarks` requires explicit prosody control inside
/// the markup. `PlainText` has no native mark or break support at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupDialect {
    InlineMarks,
    ProsodyMarks,
    PlainText,
}

/// Render one batch for the given dialect. `playback_speed` multiplies the
/// batch's own speed ratio; only the prosody dialect embeds it in the markup.
/// An empty batch renders to an empty root element.
pub fn render(batch: &Batch, dialect: MarkupDialect, playback_speed: f32) -> String {
    match dialect {
        MarkupDialect::InlineMarks => render_inline_marks(batch),
        MarkupDialect::ProsodyMarks => render_prosody_marks(batch, playback_speed),
        MarkupDialect::PlainText => batch
            .units
            .iter()
            .map(|unit| unit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_inline_marks(batch: &Batch) -> String {
    let mut markup = String::from("<speak>");
    push_marked_units(&mut markup, batch);
    markup.push_str("</speak>");
    markup
}

fn render_prosody_marks(batch: &Batch, playback_speed: f32) -> String {
    if batch.units.is_empty() {
        return "<speak></speak>".to_string();
    }

    let rate = rate_percentage(batch.speed * playback_speed);
    let mut markup = String::from("<speak>");
    if batch.pitch != 0.0 {
        markup.push_str(&format!(
            "<prosody rate=\"{}%\" pitch=\"{:+.0}st\">",
            rate, batch.pitch
        ));
    } else {
        markup.push_str(&format!("<prosody rate=\"{}%\">", rate));
    }
    push_marked_units(&mut markup, batch);
    markup.push_str("</prosody></speak>");
    markup
}

fn push_marked_units(markup: &mut String, batch: &Batch) {
    for unit in &batch.units {
        markup.push_str(&format!("<mark name=\"{}\"/>", unit.mark_name));
        markup.push_str(&escape_markup(&unit.text));
        markup.push_str(&format!("<break time=\"{INTER_UNIT_BREAK_MS}ms\"/>"));
    }
}

/// Speed ratio expressed as the integer percentage prosody expects
/// (0.7 -> 70).
pub fn rate_percentage(speed: f32) -> i32 {
    (speed * 100.0).round() as i32
}

/// Escape the five markup-special characters. Ampersand first so already
/// escaped entities are not double-escaped into garbage.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Substring scan for the fixed control-token vocabulary.
pub fn contains_control_token(text: &str) -> bool {
    CONTROL_TOKENS.iter().any(|token| text.contains(token))
}

/// Render a single unit for the mark-less backend. The trailing break token
/// is only appended for the final unit of the final batch routed there.
pub fn render_plain_unit(text: &str, append_trailing_break: bool) -> String {
    if append_trailing_break {
        format!("{text} {TRAILING_BREAK_TOKEN}")
    } else {
        text.to_string()
    }
}
