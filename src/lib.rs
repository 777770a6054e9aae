//! # cronparse
//!
//! Parses classic five-field cron expressions and finds the next minute they match.
//!
//! ## Features
//! - Parses wildcards, fixed values, steps, ranges, stepped ranges and lists of them.
//! - Finds the next matching minute at or after any reference time.
//! - Follows the standard cron rule of matching a day when either a restricted
//!   day of month or a restricted day of week matches.
//! - Works on naive local time, or any `chrono` timezone the caller already has.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use cronparse::Cron;
//!
//! // At 02:01 every Wednesday
//! let cron: Cron = "1 2 * * 3".parse().expect("Successful parsing");
//!
//! let reference = NaiveDate::from_ymd_opt(2014, 8, 8)
//!     .unwrap()
//!     .and_hms_opt(8, 8, 0)
//!     .unwrap();
//! let next = cron.next_run(&reference).unwrap();
//!
//! assert_eq!(next.to_string(), "2014-08-13 02:01:00");
//! ```
//!
//! ## Pattern
//!
//! ```javascript
//! // ┌────────────── minute (0 - 59)
//! // │ ┌──────────── hour (0 - 23)
//! // │ │ ┌────────── day of month (1 - 31)
//! // │ │ │ ┌──────── month (1 - 12)
//! // │ │ │ │ ┌────── day of week (0 - 6, 0 is Sunday)
//! // │ │ │ │ │
//! // * * * * *
//! ```
//!
//! | Syntax    | Meaning                                                  |
//! | --------- | -------------------------------------------------------- |
//! | `*`       | any value                                                |
//! | `n`       | exactly `n`                                              |
//! | `*/n`     | any value divisible by `n`                               |
//! | `a-b`     | any value from `a` to `b`, inclusive                     |
//! | `a-b/n`   | any value from `a` to `b` that is also divisible by `n`  |
//! | `x,y,...` | any of the comma separated items above                   |
//!
//! Steps count from zero rather than from the start of the range, so `1-10/3`
//! matches 3, 6 and 9.
//!
//! Values outside a field's range are accepted and never match, unless the
//! parser is built with [`strict_ranges`](parser::CronParserBuilder::strict_ranges).
//! The search gives up with [`CronError::SearchLimitExceeded`] when nothing
//! matches within 100 years of the reference time.
//!
//! ## Feature flags
//! * `clock` (default): adds [`Cron::next_run_from_now`].
//! * `serde`: serializes [`Cron`] as its expression string.

pub mod component;
pub mod errors;
pub mod iterator;
pub mod parser;
pub mod pattern;

pub use errors::CronError;
pub use iterator::CronIterator;
use parser::CronParser;
use pattern::CronPattern;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike,
};
#[cfg(feature = "serde")]
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use tracing::{debug, trace};

/// How many years past the reference year the search may run before giving up.
pub const SEARCH_YEAR_LIMIT: i32 = 100;

/// Convenient alias for `Result`.
pub type Result<T, E = CronError> = std::result::Result<T, E>;

enum TimeComponent {
    Minute,
    Hour,
    Day,
    Month,
}

/// A parsed cron expression.
///
/// `Cron` is immutable once parsed and can be shared between threads and
/// queried any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cron {
    pub pattern: CronPattern, // Parsed cron pattern
}

impl Cron {
    /// Evaluates if a given `DateTime` matches the cron expression, using its
    /// local wall-clock fields. Seconds are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{FixedOffset, TimeZone};
    /// use cronparse::Cron;
    ///
    /// let cron: Cron = "0 12 * * *".parse().unwrap();
    /// let noon = FixedOffset::east_opt(3600)
    ///     .unwrap()
    ///     .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
    ///     .unwrap();
    ///
    /// assert!(cron.is_time_matching(&noon));
    /// ```
    pub fn is_time_matching<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> bool {
        self.pattern.is_matching(&time.naive_local())
    }

    /// Evaluates if a naive local time matches the cron expression. Seconds are ignored.
    pub fn is_naive_time_matching(&self, time: &NaiveDateTime) -> bool {
        self.pattern.is_matching(time)
    }

    /// Finds the first whole minute at or after `reference` that matches the expression.
    ///
    /// `reference` is truncated to the minute first, so a reference of 08:08:30
    /// can yield 08:08:00. The search moves forward one month, day, hour or
    /// minute at a time, always skipping the coarsest field that does not
    /// match, so sparse expressions such as `0 0 29 2 *` resolve in a few
    /// hundred steps.
    ///
    /// # Errors
    ///
    /// - `CronError::SearchLimitExceeded`: nothing matches within
    ///   [`SEARCH_YEAR_LIMIT`] years of `reference`, as with `0 0 31 2 *`.
    /// - `CronError::InvalidTime`: date arithmetic overflowed `chrono`'s range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use cronparse::Cron;
    ///
    /// let cron: Cron = "5 */10 * * *".parse().unwrap();
    /// let reference = NaiveDate::from_ymd_opt(2014, 8, 8)
    ///     .unwrap()
    ///     .and_hms_opt(8, 8, 0)
    ///     .unwrap();
    ///
    /// let next = cron.next_run(&reference).unwrap();
    /// assert_eq!(next.to_string(), "2014-08-08 10:05:00");
    /// ```
    pub fn next_run(&self, reference: &NaiveDateTime) -> Result<NaiveDateTime> {
        if !self.pattern.is_satisfiable() {
            debug!(pattern = %self.pattern, "pattern can never match");
            return Err(CronError::SearchLimitExceeded);
        }

        let mut current_time = truncate_to_minute(reference)?;
        let mut steps: u64 = 0;

        loop {
            if current_time.year() - reference.year() > SEARCH_YEAR_LIMIT {
                debug!(pattern = %self.pattern, %reference, steps, "search limit exceeded");
                return Err(CronError::SearchLimitExceeded);
            }
            steps += 1;

            // The month check is not exclusive with the others, the day check
            // below runs against the first day of the new month.
            let mut month_advanced = false;
            if !self.pattern.month_match(current_time.month()) {
                increment_time_component(&mut current_time, TimeComponent::Month)?;
                trace!(%current_time, "skipped to next month");
                month_advanced = true;
            }

            if !self.pattern.day_match(current_time.date()) {
                increment_time_component(&mut current_time, TimeComponent::Day)?;
            } else if !self.pattern.hour_match(current_time.hour()) {
                increment_time_component(&mut current_time, TimeComponent::Hour)?;
            } else if !self.pattern.minute_match(current_time.minute()) {
                increment_time_component(&mut current_time, TimeComponent::Minute)?;
            } else if !month_advanced {
                debug!(pattern = %self.pattern, %reference, next = %current_time, steps, "found next run");
                return Ok(current_time);
            }
        }
    }

    /// Finds the next run after the current local time.
    #[cfg(feature = "clock")]
    pub fn next_run_from_now(&self) -> Result<NaiveDateTime> {
        self.next_run(&chrono::Local::now().naive_local())
    }

    /// Finds the next occurrence on the local wall clock of `start_time`.
    ///
    /// If `inclusive` is `true`, the minute containing `start_time` is a
    /// candidate; otherwise the search starts at the following minute.
    /// The result is always the earliest matching instant after that point.
    ///
    /// Around daylight saving transitions:
    /// - local times the clock skips are passed over;
    /// - a local time the clock repeats runs in both passes when the minute or
    ///   hour field is an interval (`0 * * * *`, `*/30 1 * * *`), and only in
    ///   the first pass when both fields list single values (`30 1 * * *`).
    ///
    /// # Errors
    ///
    /// Same as [`Cron::next_run`], counting the year limit from `start_time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use cronparse::Cron;
    ///
    /// let cron: Cron = "0 18 * * 5".parse().unwrap();
    /// let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    ///
    /// let next = cron.find_next_occurrence(&time, false).unwrap();
    /// assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 5, 18, 0, 0).unwrap());
    /// ```
    pub fn find_next_occurrence<Tz: TimeZone>(
        &self,
        start_time: &DateTime<Tz>,
        inclusive: bool,
    ) -> Result<DateTime<Tz>> {
        let timezone = start_time.timezone();
        let repeat_in_fold = !self.pattern.is_fixed_time();

        let sub_minute = Duration::seconds(i64::from(start_time.second()))
            + Duration::nanoseconds(i64::from(start_time.nanosecond()));
        let mut not_before = start_time
            .clone()
            .checked_sub_signed(sub_minute)
            .ok_or(CronError::InvalidTime)?;
        if !inclusive {
            not_before = not_before
                .checked_add_signed(Duration::minutes(1))
                .ok_or(CronError::InvalidTime)?;
        }
        let naive_start = not_before.naive_local();

        let found = self
            .search_local(&timezone, naive_start, None, &not_before, repeat_in_fold)?
            .ok_or(CronError::SearchLimitExceeded)?;

        if !repeat_in_fold {
            return Ok(found);
        }

        // Starting in the first pass of a repeated hour, the second pass is
        // still ahead although its wall clock reads earlier.
        if let LocalResult::Ambiguous(earliest, latest) = timezone.from_local_datetime(&naive_start) {
            if earliest == not_before {
                let rewind = latest - earliest;
                let from = naive_start
                    .checked_sub_signed(rewind)
                    .ok_or(CronError::InvalidTime)?;
                let repeated = self.search_local(
                    &timezone,
                    from,
                    Some(naive_start),
                    &not_before,
                    repeat_in_fold,
                )?;
                if let Some(repeated) = repeated.filter(|repeated| *repeated < found) {
                    return Ok(repeated);
                }
            }
        }

        Ok(found)
    }

    // Walks matching wall-clock minutes from `from` (up to `until`, if given)
    // and returns the first one that maps to an instant at or after `not_before`.
    fn search_local<Tz: TimeZone>(
        &self,
        timezone: &Tz,
        from: NaiveDateTime,
        until: Option<NaiveDateTime>,
        not_before: &DateTime<Tz>,
        repeat_in_fold: bool,
    ) -> Result<Option<DateTime<Tz>>> {
        let start_year = from.year();
        let mut naive_time = from;

        loop {
            let next = self.next_run(&naive_time)?;
            if until.is_some_and(|until| next >= until) {
                return Ok(None);
            }
            if next.year() - start_year > SEARCH_YEAR_LIMIT {
                return Err(CronError::SearchLimitExceeded);
            }

            match timezone.from_local_datetime(&next) {
                LocalResult::Single(found) if found >= *not_before => return Ok(Some(found)),
                LocalResult::Single(_) => {}
                LocalResult::Ambiguous(earliest, latest) => {
                    if earliest >= *not_before {
                        return Ok(Some(earliest));
                    }
                    if repeat_in_fold && latest >= *not_before {
                        return Ok(Some(latest));
                    }
                }
                LocalResult::None => {
                    trace!(pattern = %self.pattern, local = %next, "skipping nonexistent local time");
                }
            }

            naive_time = next;
            increment_time_component(&mut naive_time, TimeComponent::Minute)?;
        }
    }

    /// Creates a `CronIterator` starting from the specified time.
    ///
    /// The iterator yields `start_from` itself first if it matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use cronparse::Cron;
    ///
    /// let cron: Cron = "0 0 * * *".parse().unwrap();
    /// let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    ///
    /// let days: Vec<u32> = cron
    ///     .iter_from(time)
    ///     .take(3)
    ///     .map(|t| chrono::Datelike::day(&t))
    ///     .collect();
    /// assert_eq!(days, vec![1, 2, 3]);
    /// ```
    pub fn iter_from<Tz: TimeZone>(&self, start_from: DateTime<Tz>) -> CronIterator<Tz> {
        CronIterator::new(self.clone(), start_from, true)
    }

    /// Creates a `CronIterator` starting after the specified time.
    ///
    /// The iterator never yields the minute containing `start_after`.
    pub fn iter_after<Tz: TimeZone>(&self, start_after: DateTime<Tz>) -> CronIterator<Tz> {
        CronIterator::new(self.clone(), start_after, false)
    }
}

// Enables creating a Cron instance from a string slice, returning a CronError if parsing fails.
impl FromStr for Cron {
    type Err = CronError;

    fn from_str(cron_string: &str) -> Result<Cron, CronError> {
        CronParser::new().parse(cron_string)
    }
}

impl std::fmt::Display for Cron {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Cron {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.pattern.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Cron {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CronVisitor;

        impl Visitor<'_> for CronVisitor {
            type Value = Cron;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a five field cron expression")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Cron::from_str(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(CronVisitor)
    }
}

fn truncate_to_minute(time: &NaiveDateTime) -> Result<NaiveDateTime> {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .ok_or(CronError::InvalidTime)
}

// Moves to the start of the next unit, zeroing every finer field.
fn increment_time_component(
    current_time: &mut NaiveDateTime,
    component: TimeComponent,
) -> Result<()> {
    let next = match component {
        TimeComponent::Month => {
            let (year, month) = match current_time.month() {
                12 => (current_time.year() + 1, 1),
                month => (current_time.year(), month + 1),
            };
            NaiveDate::from_ymd_opt(year, month, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
        }
        TimeComponent::Day => current_time
            .date()
            .succ_opt()
            .and_then(|date| date.and_hms_opt(0, 0, 0)),
        TimeComponent::Hour => current_time
            .date()
            .and_hms_opt(current_time.hour(), 0, 0)
            .and_then(|time| time.checked_add_signed(Duration::hours(1))),
        TimeComponent::Minute => current_time.checked_add_signed(Duration::minutes(1)),
    };

    *current_time = next.ok_or(CronError::InvalidTime)?;
    Ok(())
}
