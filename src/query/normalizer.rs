//! Query normalizer: runs the phrase extractors in fixed order

use chrono::{DateTime, Local, TimeZone, Weekday};
use std::sync::Arc;

use crate::extract::{
    extract_date, extract_result_types, extract_sender, extract_sentiment, remove_spans,
    Extraction, ExtractorKind,
};
use crate::patterns::PatternRegistry;
use crate::query::{Filter, ParsedQuery};

/// Turns free text into a [`ParsedQuery`]
///
/// Extractors run date → type → sender → sentiment, each over the residual
/// text left by the previous one, so a consumed phrase is never matched twice.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    patterns: Arc<PatternRegistry>,
    week_start: Weekday,
}

impl QueryNormalizer {
    pub fn new(patterns: Arc<PatternRegistry>, week_start: Weekday) -> Self {
        Self {
            patterns,
            week_start,
        }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Normalize against the local clock
    pub fn normalize(&self, query: &str) -> ParsedQuery {
        self.normalize_at(query, &Local::now())
    }

    /// Normalize with an explicit "now"; deterministic for a given input
    ///
    /// Removing one phrase can join the words around it into a new cue
    /// (`last files week`), so passes repeat until nothing more is consumed.
    /// Later passes only fill fields that are still unset; type keywords
    /// always accumulate.
    pub fn normalize_at<Tz: TimeZone>(&self, query: &str, now: &DateTime<Tz>) -> ParsedQuery {
        let mut residual = query.to_string();
        let mut filter = Filter::default();

        loop {
            let mut consumed = false;
            for kind in ExtractorKind::ORDER {
                if !accepts(kind, &filter) {
                    continue;
                }
                if let Some(extraction) = self.run(kind, &residual, now) {
                    tracing::debug!(
                        "{:?} consumed {:?}",
                        extraction.kind,
                        extraction.matched(&residual)
                    );
                    residual = remove_spans(&residual, &extraction.spans);
                    filter.merge(extraction.fragment);
                    consumed = true;
                }
            }
            if !consumed {
                break;
            }
        }

        let clean_query = residual.split_whitespace().collect::<Vec<_>>().join(" ");
        tracing::debug!("Normalized '{}' -> '{}' {:?}", query, clean_query, filter);

        ParsedQuery {
            clean_query,
            filter,
        }
    }

    fn run<Tz: TimeZone>(
        &self,
        kind: ExtractorKind,
        text: &str,
        now: &DateTime<Tz>,
    ) -> Option<Extraction> {
        match kind {
            ExtractorKind::DatePhrase => extract_date(&self.patterns, text, now, self.week_start),
            ExtractorKind::TypeKeyword => extract_result_types(&self.patterns, text),
            ExtractorKind::Sender => extract_sender(&self.patterns, text),
            ExtractorKind::Sentiment => extract_sentiment(&self.patterns, text),
        }
    }
}

/// Whether `kind` may still contribute to `filter`
///
/// A set date, sender or sentiment is final; leftovers of those kinds stay in
/// the text.
fn accepts(kind: ExtractorKind, filter: &Filter) -> bool {
    match kind {
        ExtractorKind::DatePhrase => filter.date_range.is_none(),
        ExtractorKind::TypeKeyword => true,
        ExtractorKind::Sender => filter.contacts.is_none(),
        ExtractorKind::Sentiment => filter.sentiment.is_none(),
    }
}
