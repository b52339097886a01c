//! Pattern registry for configuration-driven phrase extraction
//!
//! This module provides:
//! - Keyword vocabularies loaded from `keywords.toml` (or the built-in defaults)
//! - Pre-compiled, case-insensitive regexes for every extractor
//! - Named date phrases in their fixed priority order

use crate::error::{Result, SmartSearchError};
use crate::extract::NamedRange;
use crate::query::ResultType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Keyword group mapping phrases to one result type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTypeKeywords {
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub keywords: Vec<String>,
}

/// Sender construct keywords (`from <name>`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderKeywords {
    pub keywords: Vec<String>,
}

/// Sentiment cue words
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentKeywords {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// Numeric date phrase prefixes (`in 3 days`, `from 2 weeks ago`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateKeywords {
    pub numeric_prefixes: Vec<String>,
}

/// Keyword vocabulary file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsConfig {
    pub result_type: Vec<ResultTypeKeywords>,
    pub sender: SenderKeywords,
    pub sentiment: SentimentKeywords,
    pub dates: DateKeywords,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            result_type: vec![
                ResultTypeKeywords {
                    result_type: ResultType::Attachment,
                    keywords: words(&[
                        "file",
                        "files",
                        "attachment",
                        "attachments",
                        "document",
                        "documents",
                        "image",
                        "images",
                        "pdf",
                        "pdfs",
                    ]),
                },
                ResultTypeKeywords {
                    result_type: ResultType::Decision,
                    keywords: words(&["decision", "decisions", "decided"]),
                },
                ResultTypeKeywords {
                    result_type: ResultType::Task,
                    keywords: words(&[
                        "task",
                        "tasks",
                        "todo",
                        "todos",
                        "action item",
                        "action items",
                    ]),
                },
                ResultTypeKeywords {
                    result_type: ResultType::Mention,
                    keywords: words(&["mention", "mentions", "mentioned", "@"]),
                },
            ],
            sender: SenderKeywords {
                keywords: words(&["from"]),
            },
            sentiment: SentimentKeywords {
                positive: words(&["positive", "happy", "good"]),
                negative: words(&["negative", "upset", "bad", "angry"]),
            },
            dates: DateKeywords {
                numeric_prefixes: words(&["in", "from", "past", "last"]),
            },
        }
    }
}

/// Compiled keyword group for one result type
#[derive(Debug, Clone)]
pub struct CompiledKeywordGroup {
    pub result_type: ResultType,
    pub regex: Regex,
}

/// Pattern registry with all pre-compiled patterns
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Named date phrases in priority order
    pub named_dates: Vec<(NamedRange, Regex)>,
    /// `<prefix> <N> <unit>s? (ago)?`; captures 1 = N, 2 = unit
    pub numeric_date: Regex,
    /// Result type keyword groups
    pub result_types: Vec<CompiledKeywordGroup>,
    /// `from <name>`; captures 1/2 = quoted name, 3 = bare word
    pub sender: Regex,
    pub positive: Option<Regex>,
    pub negative: Option<Regex>,
}

impl PatternRegistry {
    /// Registry built from the built-in vocabulary
    pub fn builtin() -> Result<Self> {
        Self::from_config(KeywordsConfig::default())
    }

    /// Load pattern registry from a keywords file
    pub fn from_config_file(keywords_path: &Path) -> Result<Self> {
        let keywords_toml =
            std::fs::read_to_string(keywords_path).map_err(|e| SmartSearchError::Io {
                source: e,
                context: format!("Failed to read keywords config: {:?}", keywords_path),
            })?;
        let keywords_config: KeywordsConfig = toml::from_str(&keywords_toml)?;

        Self::from_config(keywords_config)
    }

    /// Build pattern registry from a parsed vocabulary
    pub fn from_config(config: KeywordsConfig) -> Result<Self> {
        let named_dates = NamedRange::ALL
            .iter()
            .map(|range| {
                let regex = phrase_regex(&[range.phrase().to_string()])?.ok_or_else(|| {
                    SmartSearchError::Pattern(format!("Empty date phrase for {:?}", range))
                })?;
                Ok((*range, regex))
            })
            .collect::<Result<Vec<_>>>()?;

        let prefixes = alternation(&config.dates.numeric_prefixes).ok_or_else(|| {
            SmartSearchError::Pattern("dates.numeric_prefixes cannot be empty".to_string())
        })?;
        let numeric_date = compile(
            "dates.numeric_prefixes",
            &format!(r"(?i)\b(?:{})\s+(\d+)\s+(day|week|month)s?(?:\s+ago)?\b", prefixes),
        )?;

        let mut result_types = Vec::new();
        for group in &config.result_type {
            match phrase_regex(&group.keywords)? {
                Some(regex) => result_types.push(CompiledKeywordGroup {
                    result_type: group.result_type,
                    regex,
                }),
                None => tracing::debug!("Skipping empty keyword group for {}", group.result_type),
            }
        }

        let sender_keywords = alternation(&config.sender.keywords).ok_or_else(|| {
            SmartSearchError::Pattern("sender.keywords cannot be empty".to_string())
        })?;
        let sender = compile(
            "sender.keywords",
            &format!(
                r#"(?i)\b(?:{})\s+(?:"([^"]+)"|'([^']+)'|(\S+))"#,
                sender_keywords
            ),
        )?;

        Ok(Self {
            named_dates,
            numeric_date,
            result_types,
            sender,
            positive: phrase_regex(&config.sentiment.positive)?,
            negative: phrase_regex(&config.sentiment.negative)?,
        })
    }
}

/// Escaped alternation of plain words, longest first
fn alternation(words: &[String]) -> Option<String> {
    let mut words: Vec<&str> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()));
    Some(
        words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Case-insensitive whole-phrase regex for a list of phrases
///
/// Word boundaries are only asserted next to word characters so that
/// symbolic cues such as `@` still match. Inner whitespace matches any run.
fn phrase_regex(phrases: &[String]) -> Result<Option<Regex>> {
    let mut phrases: Vec<&str> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return Ok(None);
    }
    phrases.sort_by(|a, b| b.len().cmp(&a.len()));

    let branches: Vec<String> = phrases
        .iter()
        .map(|phrase| {
            let body = phrase
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            let lead = if starts_with_word_char(phrase) { r"\b" } else { "" };
            let trail = if ends_with_word_char(phrase) { r"\b" } else { "" };
            format!("{}{}{}", lead, body, trail)
        })
        .collect();

    compile(&phrases.join(", "), &format!("(?i)(?:{})", branches.join("|"))).map(Some)
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| SmartSearchError::Pattern(format!("Invalid pattern for '{}': {}", name, e)))
}

fn starts_with_word_char(s: &str) -> bool {
    s.chars().next().is_some_and(is_word_char)
}

fn ends_with_word_char(s: &str) -> bool {
    s.chars().last().is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
