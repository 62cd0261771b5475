//! Performance benchmarks for the punch engine.
//!
//! Covers the hot paths of a time-clock deployment:
//! - Daily summary calculation for one work day
//! - A full day of punches through the validation pipeline
//! - Monthly reports as the month fills up
//! - Offline queue writes
//! - The monthly summary endpoint end to end
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use uuid::Uuid;

use punch_engine::api::{AppState, create_router};
use punch_engine::calculation::calculate_daily_summary;
use punch_engine::clock::ManualClock;
use punch_engine::config::{EngineConfig, WorkTimeRules};
use punch_engine::models::{
    Employee, NewPunch, NewQueueEntry, PunchEvent, PunchRequest, PunchType,
};
use punch_engine::offline::OfflineQueue;
use punch_engine::service::{
    InMemoryPunchRepository, PunchRepository, PunchService, SummaryService,
};
use punch_engine::validation::IdentityResolver;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const SECRET: &str = "bench-secret";
const CARD: &str = "04a1b2c3";

fn make_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn bench_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.identity.hash_secret = SECRET.to_string();
    config
}

fn bench_repo() -> Arc<InMemoryPunchRepository> {
    let resolver = IdentityResolver::new(SECRET);
    Arc::new(InMemoryPunchRepository::with_employees([Employee {
        id: "emp_bench_001".to_string(),
        name: "Bench".to_string(),
        card_hash: resolver.bin_hash(CARD).unwrap(),
        is_active: true,
        hourly_rate: None,
    }]))
}

/// A standard day: 09:00 in, one-hour lunch, 18:00 out.
fn day_punches(date: NaiveDate) -> Vec<(PunchType, NaiveDateTime)> {
    let at = |h: u32| date.and_hms_opt(h, 0, 0).unwrap();
    vec![
        (PunchType::In, at(9)),
        (PunchType::Outside, at(12)),
        (PunchType::Return, at(13)),
        (PunchType::Out, at(18)),
    ]
}

/// Fills the repository with `days` consecutive standard work days.
fn seed_month(repo: &InMemoryPunchRepository, days: u32) {
    let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    for offset in 0..days {
        let date = first + Duration::days(i64::from(offset));
        for (punch_type, timestamp) in day_punches(date) {
            repo.insert_punch(NewPunch {
                employee_id: "emp_bench_001".to_string(),
                punch_type,
                timestamp,
                device_type: "card_reader".to_string(),
                note: None,
                location: None,
            })
            .unwrap();
        }
    }
}

/// Benchmark: Daily summary for one work day.
///
/// Target: < 10μs mean
fn bench_daily_summary(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let punches: Vec<PunchEvent> = day_punches(date)
        .into_iter()
        .map(|(punch_type, timestamp)| PunchEvent {
            id: Uuid::new_v4(),
            employee_id: "emp_bench_001".to_string(),
            punch_type,
            timestamp,
            device_type: "card_reader".to_string(),
            note: None,
            location: None,
        })
        .collect();
    let rules = WorkTimeRules::default();

    c.bench_function("daily_summary", |b| {
        b.iter(|| black_box(calculate_daily_summary(date, black_box(&punches), &rules)))
    });
}

/// Benchmark: A full day of punches through identity, validation and storage.
///
/// Target: < 1ms mean
fn bench_submit_day(c: &mut Criterion) {
    let config = bench_config();
    let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let requests: Vec<PunchRequest> = day_punches(date)
        .into_iter()
        .map(|(punch_type, timestamp)| PunchRequest::from_token(CARD, punch_type).at(timestamp))
        .collect();

    c.bench_function("submit_day", |b| {
        b.iter_batched(
            || {
                let clock = Arc::new(ManualClock::new(make_datetime("2026-01-15 20:00:00")));
                let queue = Arc::new(
                    OfflineQueue::open_in_memory(config.offline_queue.clone(), clock.clone())
                        .unwrap(),
                );
                PunchService::new(bench_repo(), queue, clock, &config)
            },
            |service| {
                for request in &requests {
                    black_box(service.submit(request).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

/// Benchmark: Monthly report scaling with the number of worked days.
fn bench_monthly_scaling(c: &mut Criterion) {
    let config = Arc::new(bench_config());
    let mut group = c.benchmark_group("monthly_summary");

    for days in [1u32, 5, 10, 22, 31].iter() {
        let repo = bench_repo();
        seed_month(&repo, *days);
        let service = SummaryService::new(repo, config.clone());

        group.throughput(Throughput::Elements(u64::from(*days)));
        group.bench_with_input(BenchmarkId::new("days", days), days, |b, _| {
            b.iter(|| black_box(service.monthly_summary("emp_bench_001", "2026-01").unwrap()))
        });
    }

    group.finish();
}

/// Benchmark: Writes into the offline queue.
fn bench_offline_enqueue(c: &mut Criterion) {
    let config = bench_config();
    let clock = Arc::new(ManualClock::new(make_datetime("2026-01-15 09:00:00")));
    let queue = OfflineQueue::open_in_memory(config.offline_queue.clone(), clock).unwrap();
    let start = make_datetime("2026-01-15 09:00:00");
    let mut offset = 0i64;

    c.bench_function("offline_enqueue", |b| {
        b.iter(|| {
            offset += 1;
            let entry = NewQueueEntry {
                employee_id: Some("emp_bench_001".to_string()),
                card_token: None,
                punch_type: PunchType::In,
                timestamp: start + Duration::seconds(offset),
                device_type: "card_reader".to_string(),
                location: None,
                note: None,
            };
            black_box(queue.enqueue(&entry).unwrap())
        })
    });
}

/// Benchmark: Monthly summary over HTTP.
///
/// Target: < 1ms mean
fn bench_monthly_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = bench_config();
    let repo = bench_repo();
    seed_month(&repo, 22);
    let clock = Arc::new(ManualClock::new(make_datetime("2026-02-01 09:00:00")));
    let queue =
        Arc::new(OfflineQueue::open_in_memory(config.offline_queue.clone(), clock.clone()).unwrap());
    let router = create_router(AppState::new(repo, queue, clock, config));

    c.bench_function("monthly_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("GET")
                        .uri("/employees/emp_bench_001/monthly-summary?month=2026-01")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_daily_summary,
    bench_submit_day,
    bench_monthly_scaling,
    bench_offline_enqueue,
    bench_monthly_endpoint,
);
criterion_main!(benches);
