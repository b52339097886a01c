// Sentiment cue extraction; positive cues win over negative ones
use regex::Regex;

use crate::extract::{Extraction, ExtractorKind};
use crate::patterns::PatternRegistry;
use crate::query::{Filter, SentimentClass};

/// Extract a sentiment constraint from `text`
///
/// When both classes occur only the positive cues are consumed, so the
/// negative words survive in the clean query.
pub fn extract_sentiment(patterns: &PatternRegistry, text: &str) -> Option<Extraction> {
    cue(patterns.positive.as_ref(), text, SentimentClass::Positive)
        .or_else(|| cue(patterns.negative.as_ref(), text, SentimentClass::Negative))
}

fn cue(regex: Option<&Regex>, text: &str, class: SentimentClass) -> Option<Extraction> {
    let spans: Vec<_> = regex?.find_iter(text).map(|m| m.range()).collect();
    if spans.is_empty() {
        return None;
    }

    tracing::debug!("Sentiment {:?} ({} cues)", class, spans.len());
    Some(Extraction::new(
        ExtractorKind::Sentiment,
        spans,
        Filter::with_sentiment(class),
    ))
}
