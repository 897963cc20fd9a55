//! # uhsledger-metrics
//!
//! Prometheus counters and gauges for the settlement core, registered once
//! into the process-global registry and handed out as `'static` references.
//! Call [`init`] once at process startup to force registration eagerly
//! (useful so a `/metrics` endpoint never returns an empty family list before
//! the first increment); components can otherwise just use the statics
//! directly, since `lazy_static` registers them on first access anyway.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, register_int_gauge, IntCounterVec, IntGauge};

lazy_static! {
    /// Committed ctx count, labeled by pipeline (`atomizer` | `twophase`).
    pub static ref CTX_COMMITTED: IntCounterVec = register_int_counter_vec!(
        "uhsledger_ctx_committed_total",
        "Number of transactions committed, by pipeline",
        &["pipeline"]
    )
    .expect("metric registration");

    /// Rejected ctx count, labeled by the error taxonomy category from
    /// spec.md section 7 (static_invalid, state_invalid, stxo_range, ...).
    pub static ref CTX_REJECTED: IntCounterVec = register_int_counter_vec!(
        "uhsledger_ctx_rejected_total",
        "Number of transactions rejected, by error category",
        &["reason"]
    )
    .expect("metric registration");

    /// Current atomizer block height.
    pub static ref ATOMIZER_HEIGHT: IntGauge = register_int_gauge!(
        "uhsledger_atomizer_height",
        "Most recently produced atomizer block height"
    )
    .expect("metric registration");

    /// Number of completed audit passes per locking shard process.
    pub static ref AUDIT_RUNS: IntCounterVec = register_int_counter_vec!(
        "uhsledger_audit_runs_total",
        "Number of locking-shard audit passes run, by outcome (ran|skipped)",
        &["outcome"]
    )
    .expect("metric registration");
}

/// Forces registration of every metric above into the process-global
/// registry. Idempotent: the `lazy_static` constructors only perform the
/// registration once, on first access.
pub fn init() {
    lazy_static::initialize(&CTX_COMMITTED);
    lazy_static::initialize(&CTX_REJECTED);
    lazy_static::initialize(&ATOMIZER_HEIGHT);
    lazy_static::initialize(&AUDIT_RUNS);
}

/// Snapshots every registered metric family, for a status/metrics endpoint
/// to serialize however it likes.
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    prometheus::gather()
}
