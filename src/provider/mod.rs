//! Search provider seam
//!
//! The full-text index lives outside this crate. A provider receives the
//! cleaned query and the filter, and returns candidates that already satisfy
//! the filter.

mod memory;

pub use memory::MemoryProvider;

use async_trait::async_trait;
use thiserror::Error;

use crate::query::Filter;
use crate::retrieval::RawResult;

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    #[error("Search timed out after {0} ms")]
    Timeout(u64),

    #[error("Search backend failed: {0}")]
    Backend(String),
}

/// Trait for search providers
///
/// Allows abstraction over different backends (local index, remote API, etc.)
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a filtered full-text search
    async fn search(
        &self,
        clean_query: &str,
        filter: &Filter,
    ) -> Result<Vec<RawResult>, ProviderError>;
}

/// How a provider call ended, as seen by the session
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Completed(Vec<RawResult>),
    Failed(ProviderError),
}

impl From<Result<Vec<RawResult>, ProviderError>> for ProviderOutcome {
    fn from(result: Result<Vec<RawResult>, ProviderError>) -> Self {
        match result {
            Ok(results) => ProviderOutcome::Completed(results),
            Err(e) => ProviderOutcome::Failed(e),
        }
    }
}
