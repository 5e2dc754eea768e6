//! Performance benchmarks for the payroll calculation engine.
//!
//! This benchmark suite verifies that the engine meets performance targets:
//! - Single segment classification: < 10μs mean
//! - Single employee-month (22 working days): < 1ms mean
//! - Batch of 100 employee-months sharing one cached calendar: < 100ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use payroll_engine::calculation::{CalculationOptions, PayrollCalculator, classify};
use payroll_engine::calendar::{
    CalendarResolver, HolidayEntry, HolidaySource, SabbathTimeSource, SabbathWindow, SourceResult,
};
use payroll_engine::config::PayRules;
use payroll_engine::models::{
    CompensationMode, CompensationProfile, DaySegment, InMemoryLedger, WorkInterval,
};

struct EmptyHolidaySource;

impl HolidaySource for EmptyHolidaySource {
    fn holidays(&self, _year: i32, _month: u32) -> SourceResult<Vec<HolidayEntry>> {
        Ok(Vec::new())
    }
}

struct EstimateOnlySabbathSource;

impl SabbathTimeSource for EstimateOnlySabbathSource {
    fn shabbat_times(&self, _saturday: NaiveDate) -> SourceResult<Option<SabbathWindow>> {
        Ok(None)
    }
}

/// Creates a calculator with loaded configuration and in-memory sources.
fn create_calculator() -> PayrollCalculator {
    let rules = PayRules::load("./config/israel").expect("Failed to load config");
    let resolver = CalendarResolver::new(
        vec![],
        Arc::new(EmptyHolidaySource),
        Arc::new(EstimateOnlySabbathSource),
        rules.calendar,
    );
    PayrollCalculator::new(rules, resolver)
}

fn hourly_profile() -> CompensationProfile {
    CompensationProfile {
        mode: CompensationMode::Hourly,
        hourly_rate: Some(Decimal::from_str("100").unwrap()),
        monthly_base: None,
        currency: "ILS".to_string(),
    }
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// A month of 9-hour weekday shifts plus one Saturday shift (March 2025).
fn create_month_intervals(days: usize) -> Vec<WorkInterval> {
    let weekdays = [
        3, 4, 5, 6, 10, 11, 12, 13, 16, 17, 18, 19, 20, 23, 24, 25, 26, 27, 30, 31,
    ];
    let mut intervals: Vec<WorkInterval> = weekdays
        .iter()
        .take(days)
        .map(|day| WorkInterval {
            start: dt(&format!("2025-03-{:02} 09:00:00", day)),
            end: dt(&format!("2025-03-{:02} 18:00:00", day)),
        })
        .collect();
    intervals.push(WorkInterval {
        start: dt("2025-03-15 09:00:00"),
        end: dt("2025-03-15 17:00:00"),
    });
    intervals
}

/// Benchmark: classification of a single day segment.
///
/// Target: < 10μs mean
fn bench_classify_segment(c: &mut Criterion) {
    let rules = PayRules::load("./config/israel").expect("Failed to load config");
    let segment = DaySegment {
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        total_hours: Decimal::from_str("12.0").unwrap(),
        is_sabbath: false,
        is_holiday: false,
        is_night: false,
    };

    c.bench_function("classify_segment", |b| {
        b.iter(|| black_box(classify(black_box(&segment), &rules.rates)))
    });
}

/// Benchmark: one employee-month with a full working schedule.
///
/// Target: < 1ms mean (calendar context cached after the first run)
fn bench_employee_month(c: &mut Criterion) {
    let calc = create_calculator();
    let profile = hourly_profile();
    let intervals = create_month_intervals(20);

    c.bench_function("employee_month_20_days", |b| {
        b.iter(|| {
            let mut ledger = InMemoryLedger::new();
            black_box(
                calc.calculate(
                    "emp_bench_001",
                    2025,
                    3,
                    &profile,
                    &intervals,
                    &mut ledger,
                    CalculationOptions::default(),
                )
                .unwrap(),
            )
        })
    });
}

/// Benchmark: batch of 100 employee-months sharing one cached calendar.
///
/// Target: < 100ms mean
fn bench_batch_100(c: &mut Criterion) {
    let calc = create_calculator();
    let profile = hourly_profile();
    let intervals = create_month_intervals(20);
    let employee_ids: Vec<String> = (0..100).map(|i| format!("emp_batch_{:03}", i)).collect();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100));

    group.bench_function("batch_100", |b| {
        b.iter(|| {
            let mut results = Vec::with_capacity(employee_ids.len());
            for employee_id in &employee_ids {
                let mut ledger = InMemoryLedger::new();
                results.push(
                    calc.calculate(
                        employee_id,
                        2025,
                        3,
                        &profile,
                        &intervals,
                        &mut ledger,
                        CalculationOptions::default(),
                    )
                    .unwrap(),
                );
            }
            black_box(results)
        })
    });

    group.finish();
}

/// Benchmark: various working-day counts to understand scaling behavior.
fn bench_scaling(c: &mut Criterion) {
    let calc = create_calculator();
    let profile = hourly_profile();

    let mut group = c.benchmark_group("scaling");

    for day_count in [1, 5, 10, 20].iter() {
        let intervals = create_month_intervals(*day_count);

        group.throughput(Throughput::Elements(*day_count as u64));
        group.bench_with_input(BenchmarkId::new("days", day_count), day_count, |b, _| {
            b.iter(|| {
                let mut ledger = InMemoryLedger::new();
                black_box(
                    calc.calculate(
                        "emp_bench_001",
                        2025,
                        3,
                        &profile,
                        &intervals,
                        &mut ledger,
                        CalculationOptions::default(),
                    )
                    .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_classify_segment,
    bench_employee_month,
    bench_batch_100,
    bench_scaling,
);
criterion_main!(benches);
