//! Structured query model
//!
//! A free-text query is interpreted into a [`ParsedQuery`]: the residual
//! full-text part plus a [`Filter`] describing the cues that were recognised
//! (result types, a date range, senders, sentiment).

mod normalizer;

pub use normalizer::QueryNormalizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Kind of item a search result refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Message,
    Attachment,
    Decision,
    Task,
    Mention,
}

impl ResultType {
    /// All result types in tab order
    pub const ALL: [ResultType; 5] = [
        ResultType::Message,
        ResultType::Attachment,
        ResultType::Decision,
        ResultType::Task,
        ResultType::Mention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Message => "message",
            ResultType::Attachment => "attachment",
            ResultType::Decision => "decision",
            ResultType::Task => "task",
            ResultType::Mention => "mention",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "message" => Ok(ResultType::Message),
            "attachment" => Ok(ResultType::Attachment),
            "decision" => Ok(ResultType::Decision),
            "task" => Ok(ResultType::Task),
            "mention" => Ok(ResultType::Mention),
            other => Err(format!("unknown result type '{}'", other)),
        }
    }
}

/// Sentiment constraint; absence on a [`Filter`] means unconstrained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Negative,
}

/// Closed time interval, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateRangeFields")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct DateRangeFields {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<DateRangeFields> for DateRange {
    type Error = String;

    fn try_from(fields: DateRangeFields) -> std::result::Result<Self, Self::Error> {
        DateRange::new(fields.start, fields.end).ok_or_else(|| {
            format!("date range starts after it ends: {} > {}", fields.start, fields.end)
        })
    }
}

impl DateRange {
    /// Build a range, returning `None` when `start > end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Inclusive containment check
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Structured search criteria
///
/// Every field is optional; a field that no extractor set stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_types: Option<BTreeSet<ResultType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    /// Sender names as typed, not resolved to identities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentClass>,
}

impl Filter {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.result_types.is_none()
            && self.date_range.is_none()
            && self.contacts.is_none()
            && self.sentiment.is_none()
    }

    pub fn with_result_types(types: impl IntoIterator<Item = ResultType>) -> Self {
        Self {
            result_types: Some(types.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_date_range(range: DateRange) -> Self {
        Self {
            date_range: Some(range),
            ..Self::default()
        }
    }

    pub fn with_contact(name: impl Into<String>) -> Self {
        Self {
            contacts: Some(vec![name.into()]),
            ..Self::default()
        }
    }

    pub fn with_sentiment(sentiment: SentimentClass) -> Self {
        Self {
            sentiment: Some(sentiment),
            ..Self::default()
        }
    }

    /// Fold a fragment into this filter
    ///
    /// Type sets are unioned and contacts appended in order. Date range and
    /// sentiment keep the value that was set first.
    pub fn merge(&mut self, fragment: Filter) {
        if let Some(types) = fragment.result_types {
            self.result_types
                .get_or_insert_with(BTreeSet::new)
                .extend(types);
        }
        if self.date_range.is_none() {
            self.date_range = fragment.date_range;
        }
        if let Some(contacts) = fragment.contacts {
            self.contacts.get_or_insert_with(Vec::new).extend(contacts);
        }
        if self.sentiment.is_none() {
            self.sentiment = fragment.sentiment;
        }
    }
}

/// Output of the query normalizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Residual full-text query with every consumed phrase removed
    pub clean_query: String,
    pub filter: Filter,
}
