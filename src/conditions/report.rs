//! deduplicated error reporting
//!
//! edit conditions are evaluated on every UI refresh, so a broken condition
//! would otherwise log the same failure every frame. the reporter remembers
//! each (subject, message) pair it has emitted and drops repeats.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// receives formatted "identifier: message" lines
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// forwards diagnostics to `tracing` at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::error!(target: "edit_condition", "{}", line);
    }
}

/// keeps every emitted line in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// reports each distinct (context, message) pair once
pub struct ErrorReporter {
    seen: Mutex<HashSet<(Option<String>, String)>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("reported", &self.reported_count())
            .finish()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter {
    /// reporter that logs through `tracing`
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            sink,
        }
    }

    /// emit `message` unless this exact pair was reported before
    ///
    /// returns true when the line reached the sink.
    pub fn report(&self, context: Option<&str>, message: &str) -> bool {
        let key = (context.map(str::to_string), message.to_string());

        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if !seen.insert(key) {
            return false;
        }
        drop(seen);

        match context {
            Some(context) => self.sink.emit(&format!("{}: {}", context, message)),
            None => self.sink.emit(message),
        }
        true
    }

    /// number of distinct pairs reported so far
    pub fn reported_count(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    /// forget every reported pair so they can be emitted again
    pub fn clear(&self) {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.clear();
    }
}

lazy_static::lazy_static! {
    /// process-wide reporter for hosts that do not manage their own
    static ref GLOBAL_REPORTER: ErrorReporter = ErrorReporter::new();
}

pub fn global() -> &'static ErrorReporter {
    &GLOBAL_REPORTER
}
