// Integration tests for the forward search.
//
// Every case here goes through the public API only: parse an expression,
// ask for the next run and compare against known calendar dates.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::{America::New_York, Europe::Stockholm};
use cronparse::parser::CronParser;
use cronparse::{Cron, CronError};
use rstest::rstest;
use std::str::FromStr;
use std::time::Instant;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Walks forward one minute at a time until the expression matches.
fn brute_force_next(cron: &Cron, reference: NaiveDateTime, limit_minutes: i64) -> Option<NaiveDateTime> {
    let start = reference.with_second(0)?.with_nanosecond(0)?;
    (0..limit_minutes)
        .map(|i| start + Duration::minutes(i))
        .find(|time| cron.is_naive_time_matching(time))
}

#[cfg(test)]
mod reference_cases {
    use super::*;

    #[rstest]
    #[case("* * * * *", at(2014, 8, 8, 8, 8))]
    #[case("10 * * * *", at(2014, 8, 8, 8, 10))]
    #[case("5 */10 * * *", at(2014, 8, 8, 10, 5))]
    #[case("5 6 30 1 *", at(2015, 1, 30, 6, 5))]
    #[case("1 2 * * 3", at(2014, 8, 13, 2, 1))]
    #[case("59 14-23/23 29 2 *", at(2016, 2, 29, 23, 59))]
    fn test_reference_expressions(#[case] source: &str, #[case] expected: NaiveDateTime) {
        let cron = Cron::from_str(source).unwrap();
        assert_eq!(cron.next_run(&at(2014, 8, 8, 8, 8)), Ok(expected));
    }

    #[test]
    fn test_sparse_expression_is_fast() {
        let cron = Cron::from_str("59 14-23/23 29 2 *").unwrap();
        let started = Instant::now();
        let next = cron.next_run(&at(2014, 8, 8, 8, 8)).unwrap();
        assert_eq!(next, at(2016, 2, 29, 23, 59));
        assert!(started.elapsed().as_secs_f64() < 1.0, "took {:?}", started.elapsed());
    }

    #[rstest]
    #[case("0 0 31 2 *")]
    #[case("0 0 31 4 *")]
    #[case("0 0 30,31 2 *")]
    fn test_unsatisfiable_expression_stops(#[case] source: &str) {
        let cron = Cron::from_str(source).unwrap();
        let started = Instant::now();
        assert_eq!(
            cron.next_run(&at(2014, 8, 8, 8, 8)),
            Err(CronError::SearchLimitExceeded)
        );
        assert!(started.elapsed().as_secs_f64() < 5.0, "took {:?}", started.elapsed());
    }
}

#[cfg(test)]
mod properties {
    use super::*;

    const EXPRESSIONS: [&str; 10] = [
        "* * * * *",
        "*/7 3-5 * * *",
        "0 0 1 * *",
        "15 10 * * 0",
        "0,30 */6 13 * 2",
        "5 4 * */2 *",
        "1-10/3 * * * *",
        "45 23 * * 6",
        "0 12 15,20-22 * 1-5",
        "*/20 */5 2-4 * 7",
    ];

    const REFERENCES: [(i32, u32, u32, u32, u32); 5] = [
        (2014, 8, 8, 8, 8),
        (2023, 12, 31, 23, 59),
        (2024, 2, 28, 22, 10),
        (2021, 6, 30, 0, 0),
        (2019, 3, 17, 14, 44),
    ];

    #[test]
    fn test_next_run_is_minimal() {
        for source in EXPRESSIONS {
            let cron = Cron::from_str(source).unwrap();
            for (y, m, d, h, min) in REFERENCES {
                let reference = at(y, m, d, h, min);
                let expected = brute_force_next(&cron, reference, 60 * 24 * 45);
                assert_eq!(
                    cron.next_run(&reference).ok(),
                    expected,
                    "{source} from {reference}"
                );
            }
        }
    }

    #[test]
    fn test_next_run_is_idempotent() {
        for source in EXPRESSIONS {
            let cron = Cron::from_str(source).unwrap();
            for (y, m, d, h, min) in REFERENCES {
                let next = cron.next_run(&at(y, m, d, h, min)).unwrap();
                assert!(cron.is_naive_time_matching(&next));
                assert_eq!(cron.next_run(&next), Ok(next));
            }
        }
    }

    #[test]
    fn test_results_are_whole_minutes() {
        let cron = Cron::from_str("*/5 * * * *").unwrap();
        let reference = NaiveDate::from_ymd_opt(2020, 5, 5)
            .unwrap()
            .and_hms_milli_opt(5, 6, 7, 890)
            .unwrap();
        let next = cron.next_run(&reference).unwrap();
        assert_eq!(next, at(2020, 5, 5, 5, 10));
        assert_eq!((next.second(), next.nanosecond()), (0, 0));
    }
}

#[cfg(test)]
mod day_rules {
    use super::*;

    #[test]
    fn test_logical_or_for_date_fields() {
        // Should match on the 1st and on every Monday.
        let cron = Cron::from_str("0 12 1 * 1").unwrap();
        let first_of_month = at(2025, 7, 1, 12, 0); // A Tuesday
        let a_monday = at(2025, 7, 14, 12, 0); // Not the 1st

        assert!(cron.is_naive_time_matching(&first_of_month));
        assert!(cron.is_naive_time_matching(&a_monday));
        assert_eq!(cron.next_run(&at(2025, 7, 1, 12, 1)), Ok(at(2025, 7, 7, 12, 0)));
    }

    #[test]
    fn test_logical_and_when_configured() {
        let cron = CronParser::builder()
            .dom_and_dow(true)
            .build()
            .parse("0 12 1 * 1")
            .unwrap();
        // The next Monday the 1st after July 2025 is in September.
        assert_eq!(cron.next_run(&at(2025, 7, 1, 0, 0)), Ok(at(2025, 9, 1, 12, 0)));
    }

    #[test]
    fn test_sunday_is_zero() {
        let cron = Cron::from_str("0 0 * * 0").unwrap();
        // 2014-08-10 was a Sunday.
        assert_eq!(cron.next_run(&at(2014, 8, 8, 8, 8)), Ok(at(2014, 8, 10, 0, 0)));
    }
}

#[cfg(test)]
mod time_zones {
    use super::*;

    #[test]
    fn test_find_next_occurrence_in_time_zone() {
        let cron = Cron::from_str("0 9 * * 1").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let next = cron.find_next_occurrence(&start, false).unwrap();
        assert_eq!(next, New_York.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_nonexistent_local_time_is_skipped() {
        // Clocks in Stockholm jump from 02:00 to 03:00 on 2024-03-31.
        let cron = Cron::from_str("30 2 31 3 *").unwrap();
        let start = Stockholm.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
        assert_eq!(
            cron.find_next_occurrence(&start, false),
            Ok(Stockholm.with_ymd_and_hms(2025, 3, 31, 2, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_unsatisfiable_in_time_zone() {
        let cron = Cron::from_str("0 0 31 2 *").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            cron.find_next_occurrence(&start, false),
            Err(CronError::SearchLimitExceeded)
        );
    }

    // Clocks in New York go back from 02:00 EDT to 01:00 EST on 2024-11-03
    // and jump from 02:00 EST to 03:00 EDT on 2024-03-10.

    #[test]
    fn test_hourly_through_fall_back() {
        let cron = Cron::from_str("0 * * * *").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 11, 2, 22, 0, 0).unwrap();

        let runs: Vec<_> = cron.iter_after(start).take(10).collect();

        let hours: Vec<u32> = runs.iter().map(|t| t.hour()).collect();
        assert_eq!(hours, vec![23, 0, 1, 1, 2, 3, 4, 5, 6, 7]);
        assert!(runs.windows(2).all(|w| w[1].clone() - w[0].clone() == Duration::hours(1)));
    }

    #[test]
    fn test_interval_runs_in_instant_order_through_fall_back() {
        let cron = Cron::from_str("*/30 * * * *").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 11, 3, 0, 45, 0).unwrap();

        let runs: Vec<_> = cron.iter_after(start).take(5).collect();

        let wall_clock: Vec<(u32, u32)> = runs.iter().map(|t| (t.hour(), t.minute())).collect();
        assert_eq!(wall_clock, vec![(1, 0), (1, 30), (1, 0), (1, 30), (2, 0)]);
        assert!(runs.windows(2).all(|w| w[1].clone() - w[0].clone() == Duration::minutes(30)));
    }

    #[test]
    fn test_last_minute_before_fall_back() {
        // One minute after 01:59 EDT is 01:00 EST.
        let cron = Cron::from_str("*/15 * * * *").unwrap();
        let start = New_York
            .from_local_datetime(&at(2024, 11, 3, 1, 59))
            .earliest()
            .unwrap();
        let expected = New_York
            .from_local_datetime(&at(2024, 11, 3, 1, 0))
            .latest()
            .unwrap();
        assert_eq!(cron.find_next_occurrence(&start, false), Ok(expected));
    }

    #[test]
    fn test_fixed_time_runs_once_through_fall_back() {
        let cron = Cron::from_str("30 1 * * *").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap();

        let runs: Vec<_> = cron.iter_after(start).take(4).collect();

        let days: Vec<u32> = runs.iter().map(|t| t.day()).collect();
        assert_eq!(days, vec![1, 2, 3, 4]);
        let first_pass = New_York
            .from_local_datetime(&at(2024, 11, 3, 1, 30))
            .earliest()
            .unwrap();
        assert_eq!(runs[2], first_pass);
    }

    #[test]
    fn test_fixed_time_started_in_second_pass() {
        // 01:10 EST comes after 01:30 EDT, so the next run is a day later.
        let cron = Cron::from_str("30 1 * * *").unwrap();
        let start = New_York
            .from_local_datetime(&at(2024, 11, 3, 1, 10))
            .latest()
            .unwrap();
        assert_eq!(
            cron.find_next_occurrence(&start, false),
            Ok(New_York.with_ymd_and_hms(2024, 11, 4, 1, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_hourly_through_spring_forward() {
        let cron = Cron::from_str("0 * * * *").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

        let runs: Vec<_> = cron.iter_after(start).take(3).collect();

        let hours: Vec<u32> = runs.iter().map(|t| t.hour()).collect();
        assert_eq!(hours, vec![1, 3, 4]);
        assert!(runs.windows(2).all(|w| w[1].clone() - w[0].clone() == Duration::hours(1)));
    }

    #[test]
    fn test_daily_skips_missing_time() {
        let cron = Cron::from_str("30 2 * * *").unwrap();
        let start = New_York.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();

        let runs: Vec<_> = cron.iter_after(start).take(4).collect();

        let days: Vec<u32> = runs.iter().map(|t| t.day()).collect();
        assert_eq!(days, vec![8, 9, 11, 12]);
        assert!(runs.iter().all(|t| (t.hour(), t.minute()) == (2, 30)));
    }
}
