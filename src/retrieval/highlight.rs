//! Match highlighting over result content
//!
//! Highlights are byte spans into the untouched content. Matching uses
//! case-insensitive regexes over the original text, so offsets stay valid even
//! where lowercasing would change the byte length of a character.

use ahash::{HashSet, HashSetExt};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Highlighted byte range `[start, end)` within a result's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Piece of content, either highlighted or plain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Distinct whitespace-delimited tokens, first occurrence wins
pub fn query_terms(clean_query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    clean_query
        .split_whitespace()
        .filter(|token| seen.insert(token.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Case-insensitive literal matcher for one term
pub fn term_regex(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Non-overlapping spans of all matches of `matchers` in `content`
///
/// Earlier matches win; on equal starts the longer match wins.
pub fn find_spans(content: &str, matchers: &[Regex]) -> Vec<HighlightSpan> {
    let mut candidates: Vec<HighlightSpan> = matchers
        .iter()
        .flat_map(|regex| {
            regex.find_iter(content).map(|m| HighlightSpan {
                start: m.start(),
                end: m.end(),
            })
        })
        .filter(|span| !span.is_empty())
        .collect();
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));

    let mut spans: Vec<HighlightSpan> = Vec::with_capacity(candidates.len());
    for span in candidates {
        if spans.last().map_or(true, |last| span.start >= last.end) {
            spans.push(span);
        }
    }
    spans
}

/// Split content into plain and highlighted segments
///
/// Concatenating the segment texts reproduces `content` exactly.
pub fn segments<'a>(content: &'a str, spans: &[HighlightSpan]) -> Vec<Segment<'a>> {
    let mut out = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for span in spans {
        if span.start < cursor || span.end > content.len() {
            continue;
        }
        if span.start > cursor {
            out.push(Segment {
                text: &content[cursor..span.start],
                highlighted: false,
            });
        }
        out.push(Segment {
            text: &content[span.start..span.end],
            highlighted: true,
        });
        cursor = span.end;
    }
    if cursor < content.len() {
        out.push(Segment {
            text: &content[cursor..],
            highlighted: false,
        });
    }
    out
}

/// Wrap highlighted segments in `open`/`close` markers
pub fn render(content: &str, spans: &[HighlightSpan], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(content.len() + spans.len() * (open.len() + close.len()));
    for segment in segments(content, spans) {
        if segment.highlighted {
            out.push_str(open);
            out.push_str(segment.text);
            out.push_str(close);
        } else {
            out.push_str(segment.text);
        }
    }
    out
}

/// Remove `open`/`close` markers from rendered text
pub fn strip_markup(rendered: &str, open: &str, close: &str) -> String {
    let mut out = rendered.to_string();
    for marker in [open, close] {
        if !marker.is_empty() {
            out = out.replace(marker, "");
        }
    }
    out
}
