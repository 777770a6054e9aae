use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use strum::{Display, EnumIs, EnumIter};

use crate::errors::CronError;

/// Identifies one of the five fields of a cron expression, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Field {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl Field {
    /// Smallest and largest calendar value the field can take.
    pub const fn bounds(self) -> (u32, u32) {
        match self {
            Field::Minute => (0, 59),
            Field::Hour => (0, 23),
            Field::DayOfMonth => (1, 31),
            Field::Month => (1, 12),
            Field::DayOfWeek => (0, 6),
        }
    }

    /// Reads this field's calendar value out of `time`.
    pub fn value_of(self, time: &NaiveDateTime) -> u32 {
        match self {
            Field::Minute => time.minute(),
            Field::Hour => time.hour(),
            Field::DayOfMonth => time.day(),
            Field::Month => time.month(),
            Field::DayOfWeek => cron_weekday(time.date()),
        }
    }
}

/// Day of week in cron numbering, Sunday is 0 and Saturday is 6.
pub fn cron_weekday(date: NaiveDate) -> u32 {
    (date.weekday().num_days_from_monday() + 1) % 7
}

/// A single matching rule within a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum FieldTerm {
    /// `*`
    Wildcard,
    /// `n`
    Fixed(u32),
    /// `*/n`, any value divisible by `n`.
    Step(u32),
    /// `lo-hi`, inclusive.
    Range(u32, u32),
    /// `lo-hi/n`, any value in the range that is also divisible by `n`.
    ///
    /// Divisibility is counted from zero, not from `lo`, so `1-10/3` matches
    /// 3, 6 and 9.
    RangeStep(u32, u32, u32),
}

impl FieldTerm {
    pub fn matches(&self, value: u32) -> bool {
        match *self {
            FieldTerm::Wildcard => true,
            FieldTerm::Fixed(n) => value == n,
            FieldTerm::Step(step) => value % step == 0,
            FieldTerm::Range(lo, hi) => (lo..=hi).contains(&value),
            FieldTerm::RangeStep(lo, hi, step) => (lo..=hi).contains(&value) && value % step == 0,
        }
    }
}

/// The parsed form of one cron field: a list of terms joined by logical OR.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CronComponent {
    pub field: Field,
    terms: Vec<FieldTerm>,
}

impl CronComponent {
    /// Parses a single field token such as `*/15`, `1-5` or `0,30`.
    pub fn parse(field: Field, token: &str) -> Result<Self, CronError> {
        if token == "*" {
            return Ok(Self {
                field,
                terms: vec![FieldTerm::Wildcard],
            });
        }

        let terms = token
            .split(',')
            .map(|part| Self::parse_term(field, part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { field, terms })
    }

    fn parse_term(field: Field, part: &str) -> Result<FieldTerm, CronError> {
        if part == "*" {
            Ok(FieldTerm::Wildcard)
        } else if part.contains('/') {
            Self::handle_stepping(field, part)
        } else if part.contains('-') {
            let (lo, hi) = Self::handle_range(field, part, part)?;
            Ok(FieldTerm::Range(lo, hi))
        } else {
            Ok(FieldTerm::Fixed(parse_number(field, part, "not a number")?))
        }
    }

    fn handle_stepping(field: Field, part: &str) -> Result<FieldTerm, CronError> {
        let Some((base, step)) = part.split_once('/') else {
            return Err(CronError::invalid_field(field, part, "invalid step syntax"));
        };

        let step = parse_number(field, step, "step is not a number")?;
        if step == 0 {
            return Err(CronError::invalid_field(field, part, "step cannot be zero"));
        }

        if base == "*" {
            Ok(FieldTerm::Step(step))
        } else if base.contains('-') {
            let (lo, hi) = Self::handle_range(field, base, part)?;
            Ok(FieldTerm::RangeStep(lo, hi, step))
        } else {
            Err(CronError::invalid_field(
                field,
                part,
                "step must follow '*' or a range",
            ))
        }
    }

    fn handle_range(field: Field, range: &str, part: &str) -> Result<(u32, u32), CronError> {
        let Some((lo, hi)) = range.split_once('-') else {
            return Err(CronError::invalid_field(field, part, "invalid range syntax"));
        };
        let lo = parse_number(field, lo, "invalid start of range")?;
        let hi = parse_number(field, hi, "invalid end of range")?;
        Ok((lo, hi))
    }

    /// Rejects literals outside the field's domain and inverted ranges.
    pub(crate) fn check_bounds(&self) -> Result<(), CronError> {
        let (min, max) = self.field.bounds();
        let out_of_range = |value: u32| CronError::OutOfRange {
            field: self.field,
            value,
            min,
            max,
        };

        for term in &self.terms {
            let (lo, hi) = match *term {
                FieldTerm::Wildcard | FieldTerm::Step(_) => continue,
                FieldTerm::Fixed(n) => (n, n),
                FieldTerm::Range(lo, hi) | FieldTerm::RangeStep(lo, hi, _) => (lo, hi),
            };
            if lo < min || lo > max {
                return Err(out_of_range(lo));
            }
            if hi < min || hi > max {
                return Err(out_of_range(hi));
            }
            if lo > hi {
                return Err(CronError::InvalidField {
                    field: self.field,
                    token: format!("{lo}-{hi}"),
                    reason: "range start is after range end",
                });
            }
        }
        Ok(())
    }

    /// True when the field was written as a bare `*`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.terms.as_slice(), [term] if term.is_wildcard())
    }

    /// True when every term is a single value, as in `30` or `0,15,45`.
    pub fn is_fixed(&self) -> bool {
        self.terms.iter().all(FieldTerm::is_fixed)
    }

    pub fn terms(&self) -> &[FieldTerm] {
        &self.terms
    }

    pub fn matches(&self, value: u32) -> bool {
        self.terms.iter().any(|term| term.matches(value))
    }

    /// True when at least one value of the field's domain matches.
    pub fn is_satisfiable(&self) -> bool {
        let (min, max) = self.field.bounds();
        (min..=max).any(|value| self.matches(value))
    }
}

// Plain ASCII digits only; `+5`, ` 5` and `` are rejected.
fn parse_number(field: Field, s: &str, reason: &'static str) -> Result<u32, CronError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CronError::invalid_field(field, s, reason));
    }
    s.parse::<u32>()
        .map_err(|_| CronError::invalid_field(field, s, "number is too large"))
}
