use thiserror::Error;

use crate::component::Field;

/// Represents errors that can occur while parsing and evaluating cron expressions.
///
/// `CronError` is used throughout the `cronparse` crate and is exported for
/// consuming programs to use.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CronError {
    /// The expression did not split into exactly five whitespace-separated fields.
    ///
    /// Carries the number of fields that were found, `0` for an empty expression.
    #[error("expression must have exactly five fields, found {0}")]
    FieldCount(usize),

    /// A field contains a token that could not be parsed.
    ///
    /// This covers non-numeric literals, non-numeric or zero step divisors and
    /// malformed ranges, such as `"a"`, `"*/x"` or `"1-"`.
    #[error("invalid {field} field '{token}': {reason}")]
    InvalidField {
        field: Field,
        token: String,
        reason: &'static str,
    },

    /// A literal lies outside the valid domain of its field.
    ///
    /// Only produced by parsers built with `strict_ranges(true)`.
    #[error("value {value} is out of range for {field} ({min}-{max})")]
    OutOfRange {
        field: Field,
        value: u32,
        min: u32,
        max: u32,
    },

    /// The search for the next run passed the 100 year limit without a match.
    ///
    /// This is typically encountered with expressions that can never match,
    /// such as the 31st of February.
    #[error("no matching time found within the search limit")]
    SearchLimitExceeded,

    /// Date arithmetic overflowed, or the matching local time does not exist
    /// (or is ambiguous) in the requested timezone.
    #[error("encountered an invalid time")]
    InvalidTime,
}

impl CronError {
    pub(crate) fn invalid_field(field: Field, token: &str, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            token: token.to_owned(),
            reason,
        }
    }
}
