//! Relevance scoring combining exact-phrase and token overlap

use regex::Regex;

use crate::config::RankingConfig;
use crate::query::Filter;
use crate::retrieval::{find_spans, query_terms, term_regex, RawResult, SearchResult};

/// Scores, orders and highlights provider candidates
#[derive(Debug, Clone)]
pub struct Ranker {
    exact_weight: f32,
    token_weight: f32,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(0.6, 0.4)
    }
}

impl Ranker {
    /// Create a ranker with the given component weights
    ///
    /// # Arguments
    /// * `exact_weight` - Weight of a whole-query substring match
    /// * `token_weight` - Weight of the fraction of query tokens present
    pub fn new(exact_weight: f32, token_weight: f32) -> Self {
        Self {
            exact_weight,
            token_weight,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.exact_match_weight, config.token_match_weight)
    }

    /// Rank candidates against the cleaned query
    ///
    /// The filter is not re-applied here; providers return candidates that
    /// already satisfy it. With an empty query results are ordered by
    /// recency and nothing is highlighted.
    pub fn rank(
        &self,
        clean_query: &str,
        filter: &Filter,
        candidates: Vec<RawResult>,
    ) -> Vec<SearchResult> {
        tracing::trace!(
            "Ranking {} candidates for '{}' {:?}",
            candidates.len(),
            clean_query,
            filter
        );

        let clean_query = clean_query.trim();
        let mut results = if clean_query.is_empty() {
            Self::rank_by_recency(candidates)
        } else {
            self.rank_by_text(clean_query, candidates)
        };

        results.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
                .then_with(|| a.id.cmp(&b.id))
        });
        results
    }

    fn rank_by_text(&self, clean_query: &str, candidates: Vec<RawResult>) -> Vec<SearchResult> {
        let phrase = term_regex(clean_query);
        let terms: Vec<(String, Regex)> = query_terms(clean_query)
            .into_iter()
            .filter_map(|term| term_regex(&term).map(|regex| (term, regex)))
            .collect();

        let mut matchers: Vec<Regex> = phrase.iter().cloned().collect();
        matchers.extend(terms.iter().map(|(_, regex)| regex.clone()));

        candidates
            .into_iter()
            .map(|raw| {
                let exact = phrase.as_ref().is_some_and(|p| p.is_match(&raw.content));
                let matched_terms: Vec<String> = terms
                    .iter()
                    .filter(|(_, regex)| regex.is_match(&raw.content))
                    .map(|(term, _)| term.clone())
                    .collect();
                let score = self.score(exact, matched_terms.len(), terms.len());
                let highlights = find_spans(&raw.content, &matchers);

                SearchResult::from_raw(raw, score, matched_terms, highlights)
            })
            .collect()
    }

    /// Combine match components into a score clamped to `[0, 1]`
    fn score(&self, exact: bool, matched: usize, total: usize) -> f32 {
        let exact = if exact { 1.0 } else { 0.0 };
        let fraction = if total == 0 {
            0.0
        } else {
            matched as f32 / total as f32
        };
        let score = self.exact_weight * exact + self.token_weight * fraction;
        if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        }
    }

    /// Newest candidate scores 1.0, oldest 0.0, linear in between
    fn rank_by_recency(candidates: Vec<RawResult>) -> Vec<SearchResult> {
        let newest = candidates.iter().map(|c| c.timestamp).max();
        let oldest = candidates.iter().map(|c| c.timestamp).min();
        let span_ms = match (newest, oldest) {
            (Some(newest), Some(oldest)) => (newest - oldest).num_milliseconds(),
            _ => 0,
        };

        candidates
            .into_iter()
            .map(|raw| {
                let score = match oldest {
                    Some(oldest) if span_ms > 0 => {
                        let age = (raw.timestamp - oldest).num_milliseconds() as f64;
                        (age / span_ms as f64).clamp(0.0, 1.0) as f32
                    }
                    _ => 1.0,
                };
                SearchResult::from_raw(raw, score, Vec::new(), Vec::new())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ResultType;
    use chrono::{Duration, TimeZone, Utc};

    fn raw(id: &str, content: &str, minutes_ago: i64) -> RawResult {
        let base = Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap();
        RawResult {
            id: id.to_string(),
            result_type: ResultType::Message,
            source_id: format!("src-{}", id),
            container_id: "c1".to_string(),
            container_name: "#general".to_string(),
            content: content.to_string(),
            author: "Alice".to_string(),
            timestamp: base - Duration::minutes(minutes_ago),
            sentiment: None,
        }
    }

    #[test]
    fn test_exact_match_outranks_partial() {
        let ranker = Ranker::default();
        let results = ranker.rank(
            "budget report",
            &Filter::default(),
            vec![
                raw("partial", "the report is ready", 1),
                raw("exact", "Budget report attached", 30),
                raw("none", "lunch plans", 0),
            ],
        );
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "partial", "none"]);
        assert!((results[0].relevance_score - 1.0).abs() < 1e-6);
        assert!((results[1].relevance_score - 0.2).abs() < 1e-6);
        assert_eq!(results[2].relevance_score, 0.0);
        assert_eq!(results[1].matched_terms, vec!["report"]);
    }

    #[test]
    fn test_ties_break_on_recency() {
        let results = Ranker::default().rank(
            "deck",
            &Filter::default(),
            vec![raw("old", "deck v1", 60), raw("new", "deck v2", 5)],
        );
        assert_eq!(results[0].id, "new");
        assert_eq!(results[1].id, "old");
    }

    #[test]
    fn test_empty_query_ranks_by_recency_without_highlights() {
        let results = Ranker::default().rank(
            "",
            &Filter::default(),
            vec![raw("a", "x", 60), raw("b", "y", 0), raw("c", "z", 30)],
        );
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(results[0].relevance_score, 1.0);
        assert_eq!(results[2].relevance_score, 0.0);
        assert!((results[1].relevance_score - 0.5).abs() < 1e-6);
        assert!(results.iter().all(|r| r.highlights.is_empty()));
        assert!(results.iter().all(|r| r.matched_terms.is_empty()));
    }

    #[test]
    fn test_scores_clamped_with_heavy_weights() {
        let ranker = Ranker::new(1.0, 1.0);
        let results = ranker.rank("q3", &Filter::default(), vec![raw("a", "Q3 plan", 0)]);
        assert_eq!(results[0].relevance_score, 1.0);
    }

    #[test]
    fn test_matched_terms_occur_in_content() {
        let results = Ranker::default().rank(
            "Launch DATE moved",
            &Filter::default(),
            vec![raw("a", "the launch date", 0)],
        );
        let content = results[0].content.to_lowercase();
        for term in &results[0].matched_terms {
            assert!(content.contains(&term.to_lowercase()));
        }
        assert_eq!(results[0].matched_terms, vec!["Launch", "DATE"]);
        assert_eq!(results[0].render("[", "]"), "the [launch] [date]");
    }

    #[test]
    fn test_empty_candidates() {
        assert!(Ranker::default()
            .rank("anything", &Filter::default(), vec![])
            .is_empty());
        assert!(Ranker::default().rank("", &Filter::default(), vec![]).is_empty());
    }
}
