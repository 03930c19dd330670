//! Process-wide metrics registry
//!
//! Holds the service counters and renders them in the Prometheus text
//! exposition format. One instance is created at startup and shared with
//! the request layer; there is no teardown.
//!
//! Recording never fails from the caller's point of view: a poisoned lock
//! drops the sample instead of propagating a panic into request handling.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Content type of the exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const METRIC_PREFIX: &str = "snake";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RequestLabels {
    method: String,
    route: String,
    status: u16,
}

/// Service metrics
#[derive(Debug)]
pub struct Metrics {
    http_requests: Mutex<BTreeMap<RequestLabels, u64>>,
    scores_submitted: AtomicU64,
    active_sessions: AtomicI64,
    system: Mutex<System>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests: Mutex::new(BTreeMap::new()),
            scores_submitted: AtomicU64::new(0),
            active_sessions: AtomicI64::new(0),
            system: Mutex::new(System::new()),
        }
    }

    /// Count one finished HTTP request
    pub fn record_request(&self, method: &str, route: &str, status: u16) {
        let Ok(mut requests) = self.http_requests.lock() else {
            return;
        };

        let labels = RequestLabels {
            method: method.to_string(),
            route: route.to_string(),
            status,
        };
        *requests.entry(labels).or_insert(0) += 1;
    }

    pub fn score_submitted(&self) {
        self.scores_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_started(&self) {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the session gauge; unmatched ends may take it below zero
    pub fn session_ended(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn scores_submitted(&self) -> u64 {
        self.scores_submitted.load(Ordering::Relaxed)
    }

    pub fn active_sessions(&self) -> i64 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    pub fn requests_total(&self, method: &str, route: &str, status: u16) -> u64 {
        let Ok(requests) = self.http_requests.lock() else {
            return 0;
        };

        requests
            .get(&RequestLabels {
                method: method.to_string(),
                route: route.to_string(),
                status,
            })
            .copied()
            .unwrap_or(0)
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> String {
        let mut out = String::new();

        header(
            &mut out,
            "http_requests_total",
            "Total number of HTTP requests",
            "counter",
        );
        if let Ok(requests) = self.http_requests.lock() {
            for (labels, count) in requests.iter() {
                let _ = writeln!(
                    out,
                    "{METRIC_PREFIX}_http_requests_total{{method=\"{}\",route=\"{}\",status=\"{}\"}} {}",
                    escape_label(&labels.method),
                    escape_label(&labels.route),
                    labels.status,
                    count
                );
            }
        }

        header(
            &mut out,
            "scores_submitted_total",
            "Total number of scores submitted",
            "counter",
        );
        let _ = writeln!(
            out,
            "{METRIC_PREFIX}_scores_submitted_total {}",
            self.scores_submitted()
        );

        header(
            &mut out,
            "active_sessions",
            "Active sessions (approx)",
            "gauge",
        );
        let _ = writeln!(
            out,
            "{METRIC_PREFIX}_active_sessions {}",
            self.active_sessions()
        );

        self.render_process(&mut out);
        out
    }

    /// Resource usage of this process; silently skipped if unavailable
    fn render_process(&self, out: &mut String) {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return;
        };
        let Ok(mut system) = self.system.lock() else {
            return;
        };

        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        let Some(process) = system.process(pid) else {
            return;
        };

        let gauges = [
            (
                "process_resident_memory_bytes",
                "Resident memory size in bytes",
                process.memory() as f64,
            ),
            (
                "process_virtual_memory_bytes",
                "Virtual memory size in bytes",
                process.virtual_memory() as f64,
            ),
            (
                "process_cpu_usage_percent",
                "CPU usage since the previous scrape",
                f64::from(process.cpu_usage()),
            ),
            (
                "process_start_time_seconds",
                "Start time of the process since unix epoch in seconds",
                process.start_time() as f64,
            ),
        ];

        for (name, help, value) in gauges {
            let _ = writeln!(out, "# HELP {name} {help}");
            let _ = writeln!(out, "# TYPE {name} gauge");
            let _ = writeln!(out, "{name} {value}");
        }
    }
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {METRIC_PREFIX}_{name} {help}");
    let _ = writeln!(out, "# TYPE {METRIC_PREFIX}_{name} {kind}");
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
