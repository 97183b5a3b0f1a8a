/*!
 * # Metrics Module
 *
 * In-process counters for store traffic and HTTP responses, exported in
 * Prometheus text format at `/metrics`.
 *
 * - `store_operations_total{table,operation,outcome}`
 * - `http_requests_total{method,status}`
 */

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const STORE_OPERATIONS_TOTAL: &str = "store_operations_total";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Label set in a stable order so equal sets render identically.
type Labels = BTreeMap<&'static str, String>;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<(&'static str, String), Counter>,
}

fn render_labels(labels: &Labels) -> String {
    let pairs: Vec<String> = labels
        .iter()
        .map(|(key, value)| format!("{key}=\"{}\"", value.replace('"', "\\\"")))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &'static str, labels: &Labels) -> Counter {
        self.counters
            .entry((name, render_labels(labels)))
            .or_default()
            .clone()
    }

    /// Current value of a counter, zero if it was never incremented.
    pub fn value(&self, name: &'static str, labels: &Labels) -> u64 {
        self.counters
            .get(&(name, render_labels(labels)))
            .map(|counter| counter.get())
            .unwrap_or(0)
    }

    pub fn export(&self) -> String {
        let mut series: BTreeMap<&'static str, Vec<(String, u64)>> = BTreeMap::new();
        for entry in self.counters.iter() {
            let ((name, labels), counter) = entry.pair();
            series
                .entry(*name)
                .or_default()
                .push((labels.clone(), counter.get()));
        }

        let mut output = String::new();
        for (name, mut samples) in series {
            samples.sort();
            let _ = writeln!(output, "# TYPE {name} counter");
            for (labels, value) in samples {
                let _ = writeln!(output, "{name}{labels} {value}");
            }
        }
        output
    }
}

lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

fn labels<const N: usize>(pairs: [(&'static str, &str); N]) -> Labels {
    pairs
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect()
}

pub fn record_store_call(table: &str, operation: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    METRICS
        .counter(
            STORE_OPERATIONS_TOTAL,
            &labels([("table", table), ("operation", operation), ("outcome", outcome)]),
        )
        .inc();
}

pub fn store_call_count(table: &str, operation: &str, success: bool) -> u64 {
    let outcome = if success { "success" } else { "error" };
    METRICS.value(
        STORE_OPERATIONS_TOTAL,
        &labels([("table", table), ("operation", operation), ("outcome", outcome)]),
    )
}

/// Counts every response by method and status code.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().as_str().to_string();
    let response = next.run(request).await;
    METRICS
        .counter(
            HTTP_REQUESTS_TOTAL,
            &labels([
                ("method", method.as_str()),
                ("status", response.status().as_str()),
            ]),
        )
        .inc();
    response
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export(),
    )
}
