//! Smartsearch - natural-language query interpreter and result ranker
//!
//! Turns a free-text chat search such as `files from Alice last week` into a
//! structured [`query::Filter`] and a cleaned full-text query, hands both to a
//! [`provider::SearchProvider`], then ranks and highlights what comes back.
//! A [`session::SearchSession`] ties the pieces together and guarantees only
//! the latest submission's results are ever presented.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod patterns;
pub mod provider;
pub mod query;
pub mod retrieval;
pub mod session;

pub use error::{Result, SmartSearchError};
pub use query::{Filter, ParsedQuery, QueryNormalizer, ResultType};
pub use retrieval::{Ranker, RawResult, SearchResult};
pub use session::{SearchSession, SessionHandle, SessionState};
