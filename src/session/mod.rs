//! Search session management
//!
//! A [`SearchSession`] interprets submitted queries, tags every provider
//! request with a generation number and only presents responses for the most
//! recent generation. [`SessionHandle`] runs a session on its own task so all
//! state changes happen on a single owner.

mod actor;
mod history;

pub use actor::{SessionEvent, SessionHandle};
pub use history::{FileHistoryStore, HistoryStore, RecentSearches, DEFAULT_HISTORY_CAPACITY};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::ProviderOutcome;
use crate::query::{ParsedQuery, QueryNormalizer};
use crate::retrieval::{partition_by_type, Ranker, ResultTabs, SearchResult, TabCounts};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Nothing submitted, or cleared
    Idle,
    /// Interpreting a submitted query
    Parsing,
    /// Waiting for the provider to answer the current generation
    Awaiting,
    /// Showing results (possibly none) for the current generation
    Presenting,
}

/// Request the caller must send to the provider for one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTicket {
    pub generation: u64,
    pub raw_query: String,
    pub parsed: ParsedQuery,
}

/// What happened to a provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Response belonged to the current generation and is now presented
    Presented {
        generation: u64,
        result_count: usize,
        error: bool,
    },
    /// Response was superseded and dropped
    Stale { generation: u64, current: u64 },
}

/// Serializable view of a session for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub state: SessionState,
    pub generation: u64,
    pub parsed: Option<ParsedQuery>,
    pub results: Vec<SearchResult>,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub recent_searches: Vec<String>,
    pub tabs: TabCounts,
}

/// Query interpretation and result presentation state for one user
pub struct SearchSession {
    id: Uuid,
    normalizer: QueryNormalizer,
    ranker: Ranker,
    state: SessionState,
    current_generation: u64,
    pending_query: Option<String>,
    parsed: Option<ParsedQuery>,
    results: Vec<SearchResult>,
    error_message: Option<String>,
    recent: RecentSearches,
    history: Option<Box<dyn HistoryStore>>,
}

impl SearchSession {
    /// Create a new session with session-local history
    pub fn new(normalizer: QueryNormalizer, ranker: Ranker, history_capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            normalizer,
            ranker,
            state: SessionState::Idle,
            current_generation: 0,
            pending_query: None,
            parsed: None,
            results: Vec::new(),
            error_message: None,
            recent: RecentSearches::new(history_capacity),
            history: None,
        }
    }

    /// Attach a history store and load its entries
    ///
    /// A store that fails to load leaves the history empty.
    pub fn with_history_store(mut self, store: Box<dyn HistoryStore>) -> Self {
        match store.load() {
            Ok(entries) => {
                self.recent = RecentSearches::from_entries(self.recent.capacity(), entries);
                tracing::debug!("Loaded {} recent searches", self.recent.len());
            }
            Err(e) => tracing::warn!("Failed to load search history: {}", e),
        }
        self.history = Some(store);
        self
    }

    /// Submit a query, interpreted against the local clock
    pub fn submit(&mut self, query: &str) -> SearchTicket {
        self.submit_at(query, &Local::now())
    }

    /// Submit a query with an explicit "now"
    ///
    /// Always allowed; any in-flight request is superseded and current
    /// results are discarded. An empty query becomes an unconstrained search.
    pub fn submit_at<Tz: TimeZone>(&mut self, query: &str, now: &DateTime<Tz>) -> SearchTicket {
        self.state = SessionState::Parsing;
        let parsed = self.normalizer.normalize_at(query, now);

        self.current_generation += 1;
        self.results.clear();
        self.error_message = None;
        self.parsed = Some(parsed.clone());
        self.pending_query = Some(query.to_string());
        self.state = SessionState::Awaiting;

        tracing::info!(
            "Session {} submitted generation {}: '{}'",
            self.id,
            self.current_generation,
            parsed.clean_query
        );

        SearchTicket {
            generation: self.current_generation,
            raw_query: query.to_string(),
            parsed,
        }
    }

    /// Apply a provider response
    ///
    /// Responses for any generation other than the current one are dropped
    /// without touching state.
    pub fn resolve(&mut self, generation: u64, outcome: ProviderOutcome) -> Resolution {
        if generation != self.current_generation || self.state != SessionState::Awaiting {
            tracing::debug!(
                "Discarding stale response for generation {} (current {})",
                generation,
                self.current_generation
            );
            return Resolution::Stale {
                generation,
                current: self.current_generation,
            };
        }

        let parsed = self.parsed.clone().unwrap_or_default();
        match outcome {
            ProviderOutcome::Completed(candidates) => {
                self.results = self
                    .ranker
                    .rank(&parsed.clean_query, &parsed.filter, candidates);
                self.error_message = None;
            }
            ProviderOutcome::Failed(e) => {
                tracing::warn!("Search provider failed for generation {}: {}", generation, e);
                self.results.clear();
                self.error_message = Some(e.to_string());
            }
        }
        self.state = SessionState::Presenting;

        if let Some(query) = self.pending_query.take() {
            self.record_history(&query);
        }

        tracing::info!(
            "Session {} presenting {} results for generation {}",
            self.id,
            self.results.len(),
            generation
        );

        Resolution::Presented {
            generation,
            result_count: self.results.len(),
            error: self.error_message.is_some(),
        }
    }

    /// Return to idle, discarding results
    ///
    /// The generation advances so a response still in flight becomes stale.
    pub fn clear(&mut self) {
        self.current_generation += 1;
        self.state = SessionState::Idle;
        self.pending_query = None;
        self.parsed = None;
        self.results.clear();
        self.error_message = None;
        tracing::info!("Session {} cleared", self.id);
    }

    fn record_history(&mut self, query: &str) {
        if !self.recent.push(query) {
            return;
        }
        if let Some(store) = &self.history {
            if let Err(e) = store.save(query.trim()) {
                tracing::warn!("Failed to persist search history: {}", e);
            }
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_generation(&self) -> u64 {
        self.current_generation
    }

    pub fn parsed(&self) -> Option<&ParsedQuery> {
        self.parsed.as_ref()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// True when the current generation's provider call failed
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn recent_searches(&self) -> &RecentSearches {
        &self.recent
    }

    pub fn tabs(&self) -> ResultTabs<'_> {
        partition_by_type(&self.results)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            state: self.state,
            generation: self.current_generation,
            parsed: self.parsed.clone(),
            results: self.results.clone(),
            error: self.has_error(),
            error_message: self.error_message.clone(),
            recent_searches: self.recent.to_vec(),
            tabs: self.tabs().counts(),
        }
    }
}
