// Sender extraction: `from <name>` or `from "<full name>"`
use crate::extract::{Extraction, ExtractorKind};
use crate::patterns::PatternRegistry;
use crate::query::Filter;

/// Extract the first sender construct in `text`
///
/// Later occurrences stay in the text.
pub fn extract_sender(patterns: &PatternRegistry, text: &str) -> Option<Extraction> {
    let caps = patterns.sender.captures(text)?;
    let whole = caps.get(0)?;
    let raw = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;

    let name = raw
        .as_str()
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    if name.is_empty() {
        return None;
    }

    tracing::debug!("Sender '{}'", name);
    Some(Extraction::new(
        ExtractorKind::Sender,
        vec![whole.range()],
        Filter::with_contact(name),
    ))
}
