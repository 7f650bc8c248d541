// src/utils/prometheus_metrics.rs

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Gauge, Histogram,
};

// Stream-level metrics
pub static RECORDS_PRODUCED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "pipeline_records_produced_total",
        "Total number of records emitted by sources."
    )
    .expect("Failed to register RECORDS_PRODUCED_TOTAL counter")
});

pub static RECORDS_DELIVERED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "pipeline_records_delivered_total",
        "Total number of records that survived every stage and reached the sink."
    )
    .expect("Failed to register RECORDS_DELIVERED_TOTAL counter")
});

pub static RUNS_CANCELLED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "pipeline_runs_cancelled_total",
        "Total number of runs cut short by cancellation."
    )
    .expect("Failed to register RUNS_CANCELLED_TOTAL counter")
});

// Per-stage metrics
pub static RECORDS_FORWARDED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pipeline_stage_records_forwarded_total",
        "Total number of records each stage passed downstream.",
        &["stage"]
    )
    .expect("Failed to register RECORDS_FORWARDED_TOTAL counter")
});

pub static RECORDS_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pipeline_stage_records_dropped_total",
        "Total number of records each stage dropped.",
        &["stage"]
    )
    .expect("Failed to register RECORDS_DROPPED_TOTAL counter")
});

pub static PREDICATE_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pipeline_stage_predicate_failures_total",
        "Total number of predicate evaluation failures per stage.",
        &["stage"]
    )
    .expect("Failed to register PREDICATE_FAILURES_TOTAL counter")
});

// Run-level metrics
pub static ACTIVE_RUNS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "pipeline_active_runs",
        "Number of pipeline runs currently executing."
    )
    .expect("Failed to register ACTIVE_RUNS gauge")
});

pub static RUN_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "pipeline_run_duration_seconds",
        "Histogram of wall-clock run durations."
    )
    .expect("Failed to register RUN_DURATION_SECONDS histogram")
});
