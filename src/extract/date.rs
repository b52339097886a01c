// Date-phrase extraction: named relative ranges first, numeric offsets second
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc, Weekday};

use crate::extract::{Extraction, ExtractorKind};
use crate::patterns::PatternRegistry;
use crate::query::{DateRange, Filter};

/// Named relative range, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedRange {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

impl NamedRange {
    pub const ALL: [NamedRange; 6] = [
        NamedRange::Today,
        NamedRange::Yesterday,
        NamedRange::ThisWeek,
        NamedRange::LastWeek,
        NamedRange::ThisMonth,
        NamedRange::LastMonth,
    ];

    pub fn phrase(&self) -> &'static str {
        match self {
            NamedRange::Today => "today",
            NamedRange::Yesterday => "yesterday",
            NamedRange::ThisWeek => "this week",
            NamedRange::LastWeek => "last week",
            NamedRange::ThisMonth => "this month",
            NamedRange::LastMonth => "last month",
        }
    }

    /// Calendar bounds relative to `now`
    ///
    /// Each midnight is resolved in `now`'s time zone, so a boundary on the
    /// far side of a DST change gets that day's own offset. Ranges that end
    /// in the past close one millisecond before the next boundary so that
    /// adjacent ranges never share an instant.
    pub fn bounds<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        week_start: Weekday,
    ) -> Option<DateRange> {
        let tz = now.timezone();
        let now_utc = now.with_timezone(&Utc);
        let today = now.date_naive();
        let just_before = |date: NaiveDate| {
            midnight(date, &tz).map(|instant| instant - Duration::milliseconds(1))
        };

        let (start, end) = match self {
            NamedRange::Today => (midnight(today, &tz)?, now_utc),
            NamedRange::Yesterday => (midnight(today.pred_opt()?, &tz)?, just_before(today)?),
            NamedRange::ThisWeek => (midnight(week_start_of(today, week_start), &tz)?, now_utc),
            NamedRange::LastWeek => {
                let this_week = week_start_of(today, week_start);
                (
                    midnight(this_week - Duration::days(7), &tz)?,
                    just_before(this_week)?,
                )
            }
            NamedRange::ThisMonth => (midnight(today.with_day(1)?, &tz)?, now_utc),
            NamedRange::LastMonth => {
                let this_month = today.with_day(1)?;
                (
                    midnight(this_month.checked_sub_months(Months::new(1))?, &tz)?,
                    just_before(this_month)?,
                )
            }
        };

        DateRange::new(start, end)
    }
}

/// Extract the first date phrase from `text`
///
/// Named ranges are tried in [`NamedRange::ALL`] order; numeric offsets are
/// only considered when no named phrase is present at all. Every repeat of
/// the winning phrase is consumed with it.
pub fn extract_date<Tz: TimeZone>(
    patterns: &PatternRegistry,
    text: &str,
    now: &DateTime<Tz>,
    week_start: Weekday,
) -> Option<Extraction> {
    for (range, regex) in &patterns.named_dates {
        let spans: Vec<_> = regex.find_iter(text).map(|m| m.range()).collect();
        if spans.is_empty() {
            continue;
        }
        let bounds = range.bounds(now, week_start)?;
        tracing::debug!("Date phrase '{}' x{} -> {:?}", range.phrase(), spans.len(), range);
        return Some(Extraction::new(
            ExtractorKind::DatePhrase,
            spans,
            Filter::with_date_range(bounds),
        ));
    }

    let mut winner: Option<(String, DateRange)> = None;
    let mut spans = Vec::new();
    for caps in patterns.numeric_date.captures_iter(text) {
        let (Some(whole), Some(amount), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let key = phrase_key(whole.as_str());
        match &winner {
            Some((winning, _)) => {
                if *winning == key {
                    spans.push(whole.range());
                }
            }
            None => {
                let Ok(amount) = amount.as_str().parse::<u32>() else {
                    continue;
                };
                let Some(range) = numeric_bounds(now, amount, unit.as_str()) else {
                    continue;
                };
                tracing::debug!("Numeric date phrase '{}'", whole.as_str());
                spans.push(whole.range());
                winner = Some((key, range));
            }
        }
    }

    let (_, range) = winner?;
    Some(Extraction::new(
        ExtractorKind::DatePhrase,
        spans,
        Filter::with_date_range(range),
    ))
}

/// Case and spacing insensitive identity of a matched phrase
fn phrase_key(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `now - amount * unit .. now`
fn numeric_bounds<Tz: TimeZone>(
    now: &DateTime<Tz>,
    amount: u32,
    unit: &str,
) -> Option<DateRange> {
    let start = match unit.to_ascii_lowercase().as_str() {
        "day" => now.clone().checked_sub_signed(Duration::try_days(i64::from(amount))?)?,
        "week" => now.clone().checked_sub_signed(Duration::try_weeks(i64::from(amount))?)?,
        "month" => now.clone().checked_sub_months(Months::new(amount))?,
        _ => return None,
    };
    DateRange::new(start.with_timezone(&Utc), now.with_timezone(&Utc))
}

/// Start of `date` in `tz`; a midnight skipped by DST falls to the first valid hour
fn midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let local = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|instant| instant.with_timezone(&Utc))
}

fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_sunday() - week_start.num_days_from_sunday()) % 7;
    date - Duration::days(i64::from(back))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::offset::LocalResult;
    use chrono::{FixedOffset, NaiveDateTime};

    fn registry() -> PatternRegistry {
        PatternRegistry::builtin().unwrap()
    }

    // Wednesday 2024-03-13 15:30 UTC
    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 13, 15, 30, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn range_of(extraction: &Extraction) -> DateRange {
        extraction.fragment.date_range.unwrap()
    }

    #[test]
    fn test_today() {
        let ex = extract_date(&registry(), "notes Today", &now(), Weekday::Sun).unwrap();
        let range = range_of(&ex);
        assert_eq!(range.start(), utc(2024, 3, 13, 0, 0, 0));
        assert_eq!(range.end(), utc(2024, 3, 13, 15, 30, 0));
        assert_eq!(ex.matched("notes Today"), vec!["Today"]);
    }

    #[test]
    fn test_yesterday_is_full_day() {
        let ex = extract_date(&registry(), "yesterday", &now(), Weekday::Sun).unwrap();
        let range = range_of(&ex);
        assert_eq!(range.start(), utc(2024, 3, 12, 0, 0, 0));
        assert_eq!(
            range.end(),
            utc(2024, 3, 13, 0, 0, 0) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_weeks_start_on_sunday_by_default() {
        let this = extract_date(&registry(), "this week", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&this).start(), utc(2024, 3, 10, 0, 0, 0));
        assert_eq!(range_of(&this).end(), utc(2024, 3, 13, 15, 30, 0));

        let last = extract_date(&registry(), "last week", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&last).start(), utc(2024, 3, 3, 0, 0, 0));
        assert_eq!(
            range_of(&last).end(),
            utc(2024, 3, 10, 0, 0, 0) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_monday_week_start() {
        let last = extract_date(&registry(), "last week", &now(), Weekday::Mon).unwrap();
        assert_eq!(range_of(&last).start(), utc(2024, 3, 4, 0, 0, 0));
    }

    #[test]
    fn test_months() {
        let this = extract_date(&registry(), "this month", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&this).start(), utc(2024, 3, 1, 0, 0, 0));

        let last = extract_date(&registry(), "last month", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&last).start(), utc(2024, 2, 1, 0, 0, 0));
        assert_eq!(
            range_of(&last).end(),
            utc(2024, 3, 1, 0, 0, 0) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_offset_midnight() {
        // 01:00 at +02:00 is still the previous evening in UTC
        let now = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 13, 1, 0, 0)
            .unwrap();
        let ex = extract_date(&registry(), "today", &now, Weekday::Sun).unwrap();
        assert_eq!(range_of(&ex).start(), utc(2024, 3, 12, 22, 0, 0));
    }

    #[test]
    fn test_numeric_ranges() {
        let ex = extract_date(&registry(), "in 3 days ago", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&ex).start(), utc(2024, 3, 10, 15, 30, 0));
        assert_eq!(range_of(&ex).end(), utc(2024, 3, 13, 15, 30, 0));

        let ex = extract_date(&registry(), "from 2 weeks ago", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&ex).start(), utc(2024, 2, 28, 15, 30, 0));

        let ex = extract_date(&registry(), "in 1 month", &now(), Weekday::Sun).unwrap();
        assert_eq!(range_of(&ex).start(), utc(2024, 2, 13, 15, 30, 0));
    }

    #[test]
    fn test_named_phrase_suppresses_numeric() {
        let text = "in 7 days last week";
        let ex = extract_date(&registry(), text, &now(), Weekday::Sun).unwrap();
        assert_eq!(ex.matched(text), vec!["last week"]);
    }

    #[test]
    fn test_named_priority_order() {
        let text = "yesterday or today";
        let ex = extract_date(&registry(), text, &now(), Weekday::Sun).unwrap();
        assert_eq!(ex.matched(text), vec!["today"]);
    }

    #[test]
    fn test_malformed_numbers_ignored() {
        assert!(extract_date(&registry(), "in abc days", &now(), Weekday::Sun).is_none());
        assert!(extract_date(&registry(), "in 99999999999 days", &now(), Weekday::Sun).is_none());
        assert!(extract_date(&registry(), "todays news", &now(), Weekday::Sun).is_none());
    }

    #[test]
    fn test_repeated_named_phrase_consumed() {
        let text = "today standup TODAY";
        let ex = extract_date(&registry(), text, &now(), Weekday::Sun).unwrap();
        assert_eq!(ex.matched(text), vec!["today", "TODAY"]);
    }

    #[test]
    fn test_repeated_numeric_phrase_consumed() {
        let text = "in 3 days budget IN 3  days review in 2 days";
        let ex = extract_date(&registry(), text, &now(), Weekday::Sun).unwrap();
        assert_eq!(ex.matched(text), vec!["in 3 days", "IN 3  days"]);
        assert_eq!(range_of(&ex).start(), utc(2024, 3, 10, 15, 30, 0));
    }

    /// US Eastern for early 2024: EST until 2024-03-10 02:00 local, EDT after
    #[derive(Debug, Clone, Copy)]
    struct Eastern;

    fn est() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn edt() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    fn switch_local() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap()
    }

    impl TimeZone for Eastern {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Eastern
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let switch = switch_local();
            if *local < switch {
                LocalResult::Single(est())
            } else if *local < switch + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(edt())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            // 02:00 EST is 07:00 UTC
            if *utc < switch_local() + Duration::hours(5) {
                est()
            } else {
                edt()
            }
        }
    }

    #[test]
    fn test_midnights_use_their_own_offset_across_dst() {
        // Monday 2024-03-11 10:00 EDT
        let now = Eastern.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();

        let yesterday = NamedRange::Yesterday.bounds(&now, Weekday::Sun).unwrap();
        assert_eq!(yesterday.start(), utc(2024, 3, 10, 5, 0, 0));
        assert_eq!(
            yesterday.end(),
            utc(2024, 3, 11, 4, 0, 0) - Duration::milliseconds(1)
        );

        let last_week = NamedRange::LastWeek.bounds(&now, Weekday::Sun).unwrap();
        assert_eq!(last_week.start(), utc(2024, 3, 3, 5, 0, 0));
        assert_eq!(
            last_week.end(),
            utc(2024, 3, 10, 5, 0, 0) - Duration::milliseconds(1)
        );

        let today = NamedRange::Today.bounds(&now, Weekday::Sun).unwrap();
        assert_eq!(today.start(), utc(2024, 3, 11, 4, 0, 0));
        assert_eq!(today.end(), utc(2024, 3, 11, 14, 0, 0));
    }
}
