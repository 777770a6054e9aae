use std::hint::black_box;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use criterion::{criterion_group, criterion_main, Criterion};
use cronparse::Cron;

fn next_run(pattern: &str) -> Option<NaiveDateTime> {
    let cron = Cron::from_str(pattern).expect("Couldn't parse cron string");
    let reference = NaiveDate::from_ymd_opt(2014, 8, 8)
        .and_then(|date| date.and_hms_opt(8, 8, 0))
        .expect("Valid reference time");
    black_box(cron.next_run(&reference)).ok()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse_and_next_run_every_minute", |b| {
        b.iter(|| next_run(black_box("* * * * *")))
    });
    c.bench_function("parse_and_next_run_leap_day", |b| {
        b.iter(|| next_run(black_box("59 14-23/23 29 2 *")))
    });
    c.bench_function("parse_and_next_run_unsatisfiable", |b| {
        b.iter(|| next_run(black_box("0 0 31 2 *")))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
