//! Remote diagnostic reporting for extension failures

use std::sync::{Arc, Mutex};

use super::error::{ErrorKind, ExtensionManagerError};

/// Receives a copy of every exception the manager catches.
///
/// Local logging goes through `tracing`; a sink forwards the same failure to
/// a remote collector.
pub trait DiagnosticSink: Send + Sync {
    fn report_exception(&self, message: &str, error: &ExtensionManagerError);
}

/// Discards all reports
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report_exception(&self, _message: &str, _error: &ExtensionManagerError) {}
}

/// A recorded exception report
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionReport {
    pub message: String,
    pub kind: ErrorKind,
    pub detail: String,
}

/// Keeps reports in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<ExceptionReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ExceptionReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report_exception(&self, message: &str, error: &ExtensionManagerError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(ExceptionReport {
                message: message.to_string(),
                kind: error.kind(),
                detail: error.to_string(),
            });
        }
    }
}
