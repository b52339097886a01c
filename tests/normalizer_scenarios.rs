//! Query interpretation scenarios end to end through the public API

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc, Weekday};
use smartsearch::patterns::{KeywordsConfig, PatternRegistry};
use smartsearch::query::{Filter, QueryNormalizer, ResultType, SentimentClass};
use std::collections::BTreeSet;
use std::sync::Arc;

fn normalizer() -> QueryNormalizer {
    QueryNormalizer::new(Arc::new(PatternRegistry::builtin().unwrap()), Weekday::Sun)
}

// Wednesday 2024-03-13 15:30 UTC
fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 13, 15, 30, 0)
        .unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn test_sender_and_last_week() {
    let parsed = normalizer().normalize_at("messages from Alice last week", &now());

    assert_eq!(parsed.clean_query, "messages");
    assert_eq!(parsed.filter.contacts, Some(vec!["Alice".to_string()]));
    assert_eq!(parsed.filter.result_types, None);
    assert_eq!(parsed.filter.sentiment, None);

    let range = parsed.filter.date_range.unwrap();
    assert_eq!(range.start(), utc(2024, 3, 3, 0, 0));
    assert_eq!(range.end(), utc(2024, 3, 10, 0, 0) - Duration::milliseconds(1));
}

#[test]
fn test_multiple_type_keywords() {
    let parsed = normalizer().normalize_at("files and decisions about Q3", &now());

    let expected: BTreeSet<_> = [ResultType::Attachment, ResultType::Decision].into();
    assert_eq!(parsed.filter.result_types, Some(expected));
    assert_eq!(parsed.clean_query, "and about Q3");
    assert!(parsed.filter.contacts.is_none());
    assert!(parsed.filter.date_range.is_none());
}

#[test]
fn test_empty_query() {
    let parsed = normalizer().normalize_at("", &now());
    assert_eq!(parsed.clean_query, "");
    assert!(parsed.filter.is_empty());

    let parsed = normalizer().normalize_at("   \t ", &now());
    assert_eq!(parsed.clean_query, "");
    assert!(parsed.filter.is_empty());
}

#[test]
fn test_numeric_offset_with_task_keyword() {
    let parsed = normalizer().normalize_at("in 3 days ago tasks", &now());

    let range = parsed.filter.date_range.unwrap();
    assert_eq!(range.start(), utc(2024, 3, 10, 15, 30));
    assert_eq!(range.end(), utc(2024, 3, 13, 15, 30));
    assert_eq!(
        parsed.filter.result_types,
        Some(BTreeSet::from([ResultType::Task]))
    );
    assert_eq!(parsed.clean_query, "");
}

#[test]
fn test_every_kind_at_once() {
    let query = "Upset TODOS from \"Dana Scully\" yesterday launch";
    let parsed = normalizer().normalize_at(query, &now());

    assert_eq!(parsed.clean_query, "launch");
    assert_eq!(
        parsed.filter.result_types,
        Some(BTreeSet::from([ResultType::Task]))
    );
    assert_eq!(parsed.filter.contacts, Some(vec!["Dana Scully".to_string()]));
    assert_eq!(parsed.filter.sentiment, Some(SentimentClass::Negative));
    assert_eq!(parsed.filter.date_range.unwrap().start(), utc(2024, 3, 12, 0, 0));
}

#[test]
fn test_week_start_changes_bounds() {
    let monday =
        QueryNormalizer::new(Arc::new(PatternRegistry::builtin().unwrap()), Weekday::Mon);
    let parsed = monday.normalize_at("this week", &now());
    assert_eq!(parsed.filter.date_range.unwrap().start(), utc(2024, 3, 11, 0, 0));
}

#[test]
fn test_custom_vocabulary() {
    let mut config = KeywordsConfig::default();
    config.sender.keywords.push("by".to_string());
    let registry = PatternRegistry::from_config(config).unwrap();
    let normalizer = QueryNormalizer::new(Arc::new(registry), Weekday::Sun);

    let parsed = normalizer.normalize_at("notes by bob", &now());
    assert_eq!(parsed.clean_query, "notes");
    assert_eq!(parsed.filter.contacts, Some(vec!["bob".to_string()]));
}

#[test]
fn test_idempotent_on_unambiguous_queries() {
    let normalizer = normalizer();
    let queries = [
        "budget files from alice yesterday",
        "happy tasks this month roadmap",
        "decisions from bob in 2 weeks",
        "launch plan",
        "attachments last month Q3 numbers",
        "last files week budget",
        "today standup today",
        "in 3 days budget in 3 days",
    ];

    for query in queries {
        let first = normalizer.normalize_at(query, &now());
        let second = normalizer.normalize_at(&first.clean_query, &now());
        assert_eq!(second.clean_query, first.clean_query, "query: {}", query);
        assert!(second.filter.is_empty(), "query: {}", query);
    }
}

#[test]
fn test_cleaning_only_removes_words() {
    let normalizer = normalizer();
    let queries = [
        "messages from Alice last week",
        "files and decisions about Q3",
        "in 3 days ago tasks",
        "good news from carol today about the launch",
        "angry mentions past 1 month",
        "plain text with no phrases",
    ];

    for query in queries {
        let clean = normalizer.normalize_at(query, &now()).clean_query;
        let mut original = query.split_whitespace();
        for token in clean.split_whitespace() {
            assert!(
                original.any(|t| t == token),
                "'{}' not an in-order token of '{}'",
                token,
                query
            );
        }
    }
}

/// Cue text plus the filter field it must set
struct Cue {
    text: &'static str,
    sets: fn(&Filter) -> bool,
}

fn cue(text: &'static str, sets: fn(&Filter) -> bool) -> Cue {
    Cue { text, sets }
}

fn has_type(filter: &Filter, result_type: ResultType) -> bool {
    filter
        .result_types
        .as_ref()
        .is_some_and(|types| types.contains(&result_type))
}

fn cue_table() -> [Vec<Cue>; 4] {
    let dates = [
        "today",
        "yesterday",
        "this week",
        "Last Week",
        "this month",
        "last month",
        "in 3 days",
        "past 2 weeks ago",
        "last 1 month",
    ]
    .into_iter()
    .map(|text| cue(text, |f| f.date_range.is_some()))
    .collect();

    let types = vec![
        cue("files", |f| has_type(f, ResultType::Attachment)),
        cue("decisions", |f| has_type(f, ResultType::Decision)),
        cue("action items", |f| has_type(f, ResultType::Task)),
        cue("TODO", |f| has_type(f, ResultType::Task)),
        cue("@", |f| has_type(f, ResultType::Mention)),
    ];

    let senders = vec![
        cue("from alice", |f| f.contacts == Some(vec!["alice".to_string()])),
        cue("from \"Dana Scully\"", |f| {
            f.contacts == Some(vec!["Dana Scully".to_string()])
        }),
    ];

    let sentiments = vec![
        cue("happy", |f| f.sentiment == Some(SentimentClass::Positive)),
        cue("angry", |f| f.sentiment == Some(SentimentClass::Negative)),
    ];

    [dates, types, senders, sentiments]
}

#[test]
fn test_generated_queries_consume_every_cue() {
    let normalizer = normalizer();
    let [dates, types, senders, sentiments] = cue_table();
    let fillers = ["budget", "Q3 roadmap", "launch notes"];
    let mut checked = 0;

    let mut check = |query: String, filler: &str, cues: [&Cue; 4]| {
        let first = normalizer.normalize_at(&query, &now());

        // Only the filler survives, so no consumed phrase is left behind
        assert_eq!(first.clean_query, filler, "query: {}", query);
        for cue in cues {
            assert!((cue.sets)(&first.filter), "'{}' not applied: {}", cue.text, query);
        }

        let second = normalizer.normalize_at(&first.clean_query, &now());
        assert_eq!(second.clean_query, first.clean_query, "query: {}", query);
        assert!(second.filter.is_empty(), "query: {}", query);
        checked += 1;
    };

    for date in &dates {
        for kind in &types {
            for sender in &senders {
                for sentiment in &sentiments {
                    let cues = [date, kind, sender, sentiment];
                    for (i, &filler) in fillers.iter().enumerate() {
                        let mut parts = vec![date.text, kind.text, sender.text, sentiment.text];
                        parts.insert(i, filler);
                        for _ in 0..parts.len() {
                            parts.rotate_left(1);
                            check(parts.join(" "), filler, cues);
                        }

                        // Repeats of the same cue are consumed together
                        let repeated = [
                            date.text,
                            filler,
                            kind.text,
                            date.text,
                            sender.text,
                            sentiment.text,
                            kind.text,
                            sentiment.text,
                        ];
                        check(repeated.join("  "), filler, cues);
                    }
                }
            }
        }
    }

    assert!(checked > 1000);
}
