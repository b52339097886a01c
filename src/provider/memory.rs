// In-memory provider over a fixed corpus, used by the CLI and tests
use async_trait::async_trait;
use std::path::Path;

use crate::error::{Result, SmartSearchError};
use crate::provider::{ProviderError, SearchProvider};
use crate::query::Filter;
use crate::retrieval::{query_terms, term_regex, RawResult};

/// Provider that filters a corpus held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    items: Vec<RawResult>,
}

impl MemoryProvider {
    pub fn new(items: Vec<RawResult>) -> Self {
        Self { items }
    }

    /// Load a JSON array of results
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SmartSearchError::Io {
            source: e,
            context: format!("Failed to read corpus file: {}", path.display()),
        })?;
        let items: Vec<RawResult> =
            serde_json::from_str(&content).map_err(|e| SmartSearchError::Json {
                source: e,
                context: format!("Failed to parse corpus file: {}", path.display()),
            })?;

        tracing::info!("Loaded {} items from {}", items.len(), path.display());
        Ok(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Synchronous search, shared by the async trait impl
    pub fn search_sync(&self, clean_query: &str, filter: &Filter) -> Vec<RawResult> {
        let terms: Vec<_> = query_terms(clean_query)
            .iter()
            .filter_map(|term| term_regex(term))
            .collect();
        let contacts: Vec<String> = filter
            .contacts
            .iter()
            .flatten()
            .map(|c| c.to_lowercase())
            .collect();

        self.items
            .iter()
            .filter(|item| {
                filter
                    .result_types
                    .as_ref()
                    .map_or(true, |types| types.contains(&item.result_type))
            })
            .filter(|item| {
                filter
                    .date_range
                    .map_or(true, |range| range.contains(item.timestamp))
            })
            .filter(|item| {
                let author = item.author.to_lowercase();
                contacts.is_empty() || contacts.iter().any(|c| author.contains(c.as_str()))
            })
            .filter(|item| filter.sentiment.map_or(true, |s| item.sentiment == Some(s)))
            .filter(|item| terms.is_empty() || terms.iter().any(|t| t.is_match(&item.content)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SearchProvider for MemoryProvider {
    async fn search(
        &self,
        clean_query: &str,
        filter: &Filter,
    ) -> std::result::Result<Vec<RawResult>, ProviderError> {
        Ok(self.search_sync(clean_query, filter))
    }
}
