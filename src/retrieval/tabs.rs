// Derived per-type views of a ranked result list
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::query::ResultType;
use crate::retrieval::SearchResult;

/// Ranked results grouped for tabbed display; rank order is preserved
#[derive(Debug, Clone, Default)]
pub struct ResultTabs<'a> {
    pub all: Vec<&'a SearchResult>,
    pub by_type: BTreeMap<ResultType, Vec<&'a SearchResult>>,
}

impl<'a> ResultTabs<'a> {
    /// Results of one type, empty if none
    pub fn tab(&self, result_type: ResultType) -> &[&'a SearchResult] {
        self.by_type
            .get(&result_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn counts(&self) -> TabCounts {
        TabCounts {
            all: self.all.len(),
            messages: self.tab(ResultType::Message).len(),
            attachments: self.tab(ResultType::Attachment).len(),
            decisions: self.tab(ResultType::Decision).len(),
            tasks: self.tab(ResultType::Task).len(),
            mentions: self.tab(ResultType::Mention).len(),
        }
    }
}

/// Badge counts per tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabCounts {
    pub all: usize,
    pub messages: usize,
    pub attachments: usize,
    pub decisions: usize,
    pub tasks: usize,
    pub mentions: usize,
}

/// Partition ranked results by [`ResultType`]
pub fn partition_by_type(results: &[SearchResult]) -> ResultTabs<'_> {
    let mut tabs = ResultTabs::default();
    for result in results {
        tabs.all.push(result);
        tabs.by_type.entry(result.result_type).or_default().push(result);
    }
    tabs
}
