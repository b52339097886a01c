//! Phrase extractors
//!
//! Each extractor is a pure rule over the current residual text. On a match it
//! yields the byte spans to remove and the [`Filter`] fragment the cue stands
//! for. Extractors never fail: text they cannot interpret is left alone.

mod date;
mod keyword;
mod sender;
mod sentiment;

pub use date::{extract_date, NamedRange};
pub use keyword::extract_result_types;
pub use sender::extract_sender;
pub use sentiment::extract_sentiment;

use crate::query::Filter;
use std::ops::Range;

/// Extractor identity, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    DatePhrase,
    TypeKeyword,
    Sender,
    Sentiment,
}

impl ExtractorKind {
    pub const ORDER: [ExtractorKind; 4] = [
        ExtractorKind::DatePhrase,
        ExtractorKind::TypeKeyword,
        ExtractorKind::Sender,
        ExtractorKind::Sentiment,
    ];
}

/// Result of one extractor run
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub kind: ExtractorKind,
    /// Byte ranges of the consumed phrases in the text the extractor saw
    pub spans: Vec<Range<usize>>,
    pub fragment: Filter,
}

impl Extraction {
    pub fn new(kind: ExtractorKind, spans: Vec<Range<usize>>, fragment: Filter) -> Self {
        Self {
            kind,
            spans,
            fragment,
        }
    }

    /// The consumed phrases as they appear in `text`
    pub fn matched<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.spans.iter().map(|span| &text[span.clone()]).collect()
    }
}

/// Replace every span with a single space
///
/// Spans may be unordered or overlap; they are merged first. The separator
/// keeps the words on either side of a removed phrase from fusing.
pub fn remove_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut sorted: Vec<Range<usize>> = spans.to_vec();
    sorted.sort_by_key(|span| (span.start, span.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in merged {
        out.push_str(&text[cursor..span.start]);
        out.push(' ');
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
