// Result-type keyword extraction
use std::collections::BTreeSet;

use crate::extract::{Extraction, ExtractorKind};
use crate::patterns::PatternRegistry;
use crate::query::{Filter, ResultType};

/// Collect every result-type keyword in `text`
///
/// All keyword groups are evaluated, each occurrence becomes a span and the
/// matched types collapse into one set.
pub fn extract_result_types(patterns: &PatternRegistry, text: &str) -> Option<Extraction> {
    let mut spans = Vec::new();
    let mut types: BTreeSet<ResultType> = BTreeSet::new();

    for group in &patterns.result_types {
        for m in group.regex.find_iter(text) {
            spans.push(m.range());
            types.insert(group.result_type);
        }
    }

    if types.is_empty() {
        return None;
    }

    tracing::debug!("Result type keywords matched: {:?}", types);
    Some(Extraction::new(
        ExtractorKind::TypeKeyword,
        spans,
        Filter::with_result_types(types),
    ))
}
