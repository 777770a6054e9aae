use crate::{Cron, CronError};
use chrono::{DateTime, TimeZone};
use tracing::warn;

/// Yields consecutive runs of a [`Cron`] expression.
///
/// Created by [`Cron::iter_from`] and [`Cron::iter_after`]. Runs come out in
/// instant order, with daylight saving transitions handled as described on
/// [`Cron::find_next_occurrence`]. Iteration ends when the search limit is
/// reached.
#[derive(Debug, Clone, PartialEq)]
pub struct CronIterator<Tz>
where
    Tz: TimeZone,
{
    cron: Cron,
    current_time: DateTime<Tz>,
    is_first: bool,
    inclusive: bool,
}

impl<Tz> CronIterator<Tz>
where
    Tz: TimeZone,
{
    /// Creates a new `CronIterator`.
    ///
    /// # Arguments
    ///
    /// * `cron` - The `Cron` schedule instance.
    /// * `start_time` - The `DateTime` to start iterating from.
    /// * `inclusive` - Whether the minute of `start_time` may be yielded if it matches.
    pub fn new(cron: Cron, start_time: DateTime<Tz>, inclusive: bool) -> Self {
        CronIterator {
            cron,
            current_time: start_time,
            is_first: true,
            inclusive,
        }
    }
}

impl<Tz> Iterator for CronIterator<Tz>
where
    Tz: TimeZone,
{
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        // Only the first search may return the starting minute.
        let inclusive_search = if self.is_first {
            self.is_first = false;
            self.inclusive
        } else {
            false
        };

        match self
            .cron
            .find_next_occurrence(&self.current_time, inclusive_search)
        {
            Ok(found_time) => {
                self.current_time = found_time.clone();
                Some(found_time)
            }
            Err(CronError::SearchLimitExceeded) => None,
            Err(e) => {
                warn!(pattern = %self.cron, error = %e, "cron iterator stopped");
                None
            }
        }
    }
}
