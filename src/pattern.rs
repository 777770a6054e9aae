use chrono::{Datelike, NaiveDate, NaiveDateTime};
use strum::IntoEnumIterator;

use crate::component::{cron_weekday, CronComponent, Field};

// Holds the five parsed fields of an expression along with the source string.
// Built once by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CronPattern {
    pub(crate) pattern: String, // The original pattern
    //
    pub minutes: CronComponent,      // -
    pub hours: CronComponent,        // --
    pub days: CronComponent,         // --- Each field of the expression as a list of terms
    pub months: CronComponent,       // --
    pub days_of_week: CronComponent, // -

    // Options
    pub dom_and_dow: bool, // Combine restricted day of month and day of week with AND instead of OR
}

impl CronPattern {
    pub fn component(&self, field: Field) -> &CronComponent {
        match field {
            Field::Minute => &self.minutes,
            Field::Hour => &self.hours,
            Field::DayOfMonth => &self.days,
            Field::Month => &self.months,
            Field::DayOfWeek => &self.days_of_week,
        }
    }

    pub fn minute_match(&self, minute: u32) -> bool {
        self.minutes.matches(minute)
    }

    pub fn hour_match(&self, hour: u32) -> bool {
        self.hours.matches(hour)
    }

    pub fn month_match(&self, month: u32) -> bool {
        self.months.matches(month)
    }

    /// Checks the day of month and day of week fields together.
    ///
    /// A bare `*` in one of the two fields leaves the decision to the other.
    /// When both are restricted, the day matches if either of them does
    /// (or both, with `dom_and_dow` enabled).
    pub fn day_match(&self, date: NaiveDate) -> bool {
        let dom_matches = || self.days.matches(date.day());
        let dow_matches = || self.days_of_week.matches(cron_weekday(date));

        if self.days_of_week.is_wildcard() {
            dom_matches()
        } else if self.days.is_wildcard() {
            dow_matches()
        } else if self.dom_and_dow {
            dom_matches() && dow_matches()
        } else {
            dom_matches() || dow_matches()
        }
    }

    /// Checks every field against the wall-clock fields of `time`, ignoring seconds.
    pub fn is_matching(&self, time: &NaiveDateTime) -> bool {
        Field::iter().all(|field| match field {
            Field::DayOfMonth => self.day_match(time.date()),
            // Decided together with the day of month.
            Field::DayOfWeek => true,
            _ => self.component(field).matches(field.value_of(time)),
        })
    }

    /// True when the minute and hour fields only list single values, so the
    /// expression names specific times of day rather than an interval.
    pub fn is_fixed_time(&self) -> bool {
        self.minutes.is_fixed() && self.hours.is_fixed()
    }

    /// False when some field can never match, whatever the date.
    ///
    /// Does not catch day and month combinations that never occur together,
    /// like the 31st of February.
    pub fn is_satisfiable(&self) -> bool {
        let days_ok = if self.days_of_week.is_wildcard() {
            self.days.is_satisfiable()
        } else if self.days.is_wildcard() {
            self.days_of_week.is_satisfiable()
        } else if self.dom_and_dow {
            self.days.is_satisfiable() && self.days_of_week.is_satisfiable()
        } else {
            self.days.is_satisfiable() || self.days_of_week.is_satisfiable()
        };

        days_ok
            && self.minutes.is_satisfiable()
            && self.hours.is_satisfiable()
            && self.months.is_satisfiable()
    }

    // Get a reference to the original pattern
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Display for CronPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
