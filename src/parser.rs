//! Parser for cron expressions.
//!
//! `cronparse` uses [`CronParser`] to parse expressions. Invoking
//!
//! ```rust
//! # use std::str::FromStr as _;
//! #
//! # use cronparse::{Cron, parser::CronParser};
//! #
//! Cron::from_str("*/5 * * * *");
//! ```
//!
//! is equivalent to
//!
//! ```rust
//! # use cronparse::{Cron, parser::CronParser};
//! #
//! CronParser::new().parse("*/5 * * * *");
//! ```
//!
//! You can customise the parser by creating a parser builder using
//! [`CronParser::builder`]. So, for example, to reject values outside of
//! each field's range do something like this:
//!
//! ```rust
//! use cronparse::parser::CronParser;
//!
//! let parser = CronParser::builder().strict_ranges(true).build();
//!
//! assert!(parser.parse("0 12 * * *").is_ok());
//! assert!(parser.parse("75 12 * * *").is_err());
//! ```

use derive_builder::Builder;

use crate::{
    component::{CronComponent, Field},
    errors::CronError,
    pattern::CronPattern,
    Cron,
};

/// Parser for cron expressions.
///
/// In order to build a custom cron parser use [`CronParser::builder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Builder)]
#[builder(default, build_fn(skip), pattern = "owned")]
pub struct CronParser {
    /// Reject literals outside each field's range, and inverted ranges.
    ///
    /// Off by default, in which case such values parse but never match.
    strict_ranges: bool,
    /// Require both a restricted day of month and a restricted day of week
    /// to match, instead of either one.
    dom_and_dow: bool,
}

impl CronParser {
    /// Create a new parser.
    ///
    /// You should probably be using [`Cron`]'s implementation of
    /// [`FromStr`][std::str::FromStr] instead of invoking this.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a builder for custom parsing.
    ///
    /// Equivalent to [`CronParserBuilder::default`].
    pub fn builder() -> CronParserBuilder {
        CronParserBuilder::default()
    }

    /// Parses the five fields of a cron expression.
    pub fn parse(&self, pattern: &str) -> Result<Cron, CronError> {
        let pattern = pattern.trim();

        let parts: Vec<&str> = pattern.split_whitespace().collect();
        let &[minute, hour, day, month, day_of_week] = parts.as_slice() else {
            return Err(CronError::FieldCount(parts.len()));
        };

        let minutes = self.parse_component(Field::Minute, minute)?;
        let hours = self.parse_component(Field::Hour, hour)?;
        let days = self.parse_component(Field::DayOfMonth, day)?;
        let months = self.parse_component(Field::Month, month)?;
        let days_of_week = self.parse_component(Field::DayOfWeek, day_of_week)?;

        Ok(Cron {
            pattern: CronPattern {
                pattern: pattern.to_string(),
                minutes,
                hours,
                days,
                months,
                days_of_week,
                dom_and_dow: self.dom_and_dow,
            },
        })
    }

    fn parse_component(&self, field: Field, token: &str) -> Result<CronComponent, CronError> {
        let component = CronComponent::parse(field, token)?;
        if self.strict_ranges {
            component.check_bounds()?;
        }
        Ok(component)
    }
}

impl CronParserBuilder {
    pub fn build(self) -> CronParser {
        let CronParserBuilder {
            strict_ranges,
            dom_and_dow,
        } = self;
        CronParser {
            strict_ranges: strict_ranges.unwrap_or_default(),
            dom_and_dow: dom_and_dow.unwrap_or_default(),
        }
    }
}
