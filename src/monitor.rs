//! Diagnostic query log: sequence number, query text and elapsed time per statement.

use std::fmt::Write;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// One executed statement as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMonitorEntry {
    pub number: u64,
    pub query: String,
    /// Elapsed wall time in milliseconds
    pub time_ms: f64,
}

/// Append-only statement log.
///
/// Share one monitor between sessions with `Arc<QueryMonitor>`; appends are serialized by
/// an internal lock, so numbering follows append order.
#[derive(Debug, Default)]
pub struct QueryMonitor {
    entries: Mutex<Vec<QueryMonitorEntry>>,
}

impl QueryMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its sequence number (starting at 1).
    pub fn record(&self, query: &str, elapsed: Duration) -> u64 {
        let mut entries = self.lock();
        let number = entries.len() as u64 + 1;
        entries.push(QueryMonitorEntry {
            number,
            query: query.to_owned(),
            time_ms: elapsed.as_secs_f64() * 1000.0,
        });
        number
    }

    /// Number of recorded statements.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Snapshot of all entries, in sequence order.
    #[must_use]
    pub fn entries(&self) -> Vec<QueryMonitorEntry> {
        self.lock().clone()
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.lock().iter().map(|e| e.time_ms).sum()
    }

    /// Render the log as a plain-text table with totals.
    #[must_use]
    pub fn report(&self) -> String {
        let entries = self.lock();
        let total: f64 = entries.iter().map(|e| e.time_ms).sum();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "queries total: {} total duration: {total:.2} ms",
            entries.len()
        );
        let _ = writeln!(out, "{:>6} | {:>10} | query", "count", "time");
        for entry in entries.iter() {
            let _ = writeln!(
                out,
                "{:>6} | {:>7.2} ms | {}",
                entry.number, entry.time_ms, entry.query
            );
        }
        out
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<QueryMonitorEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            // An append never leaves the log half-written; keep using it
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
