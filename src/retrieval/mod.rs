//! Relevance ranking, highlighting and result tabs
//!
//! Candidates arrive from a [`SearchProvider`](crate::provider::SearchProvider)
//! already filtered; this module only scores, orders and highlights them.

mod highlight;
mod ranker;
mod tabs;

pub use highlight::{
    find_spans, query_terms, render, segments, strip_markup, term_regex, HighlightSpan, Segment,
};
pub use ranker::Ranker;
pub use tabs::{partition_by_type, ResultTabs, TabCounts};

use crate::query::{ResultType, SentimentClass};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candidate returned by a search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub id: String,
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub source_id: String,
    pub container_id: String,
    pub container_name: String,
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// Provider-side classification, used when filtering by sentiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentClass>,
}

/// Ranked and highlighted result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub source_id: String,
    pub container_id: String,
    pub container_name: String,
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,

    /// Relevance score (0.0 to 1.0, higher is better)
    pub relevance_score: f32,

    /// Query terms found in `content`, in query order
    pub matched_terms: Vec<String>,

    /// Non-overlapping, ascending byte spans into `content`
    pub highlights: Vec<HighlightSpan>,
}

impl SearchResult {
    pub fn from_raw(
        raw: RawResult,
        relevance_score: f32,
        matched_terms: Vec<String>,
        highlights: Vec<HighlightSpan>,
    ) -> Self {
        Self {
            id: raw.id,
            result_type: raw.result_type,
            source_id: raw.source_id,
            container_id: raw.container_id,
            container_name: raw.container_name,
            content: raw.content,
            author: raw.author,
            timestamp: raw.timestamp,
            relevance_score,
            matched_terms,
            highlights,
        }
    }

    /// Content split into plain and highlighted pieces
    pub fn segments(&self) -> Vec<Segment<'_>> {
        segments(&self.content, &self.highlights)
    }

    /// Content with highlights wrapped in markers
    pub fn render(&self, open: &str, close: &str) -> String {
        render(&self.content, &self.highlights, open, close)
    }

    /// Get a short preview of the content (first N characters)
    pub fn preview(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.content[..idx]),
            None => self.content.clone(),
        }
    }
}
