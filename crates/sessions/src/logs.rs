//! In-memory log capture.
//!
//! [`LogCaptureLayer`] is a `tracing_subscriber::Layer` that records every
//! event into a bounded [`LogBuffer`]. The aggregator exposes that buffer as
//! its log storage, which the dashboard renders on the log page.

use std::{
    collections::VecDeque,
    fmt::{self, Write as _},
    sync::{Arc, RwLock},
};

use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    tracing::field::{Field, Visit},
    tracing_subscriber::{Layer, layer::Context},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

// ── LogBuffer ───────────────────────────────────────────────────────────────

const DEFAULT_CAPACITY: usize = 1_000;

/// Ring buffer of the most recent log records. Cloning shares the buffer.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    buf: Arc<RwLock<VecDeque<LogRecord>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, record: LogRecord) {
        if let Ok(mut buf) = self.buf.write() {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(record);
        }
    }

    /// All buffered records, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        match self.buf.read() {
            Ok(buf) => buf.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ── Visitor ─────────────────────────────────────────────────────────────────

/// Collects the `message` field and renders the remaining fields as
/// `key=value` pairs after it.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.into();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }
}

// ── LogCaptureLayer ─────────────────────────────────────────────────────────

pub struct LogCaptureLayer {
    buffer: LogBuffer,
}

impl LogCaptureLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: tracing::Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.buffer.push(LogRecord {
            timestamp: Utc::now(),
            level: meta.level().to_string(),
            target: meta.target().into(),
            message: visitor.finish(),
        });
    }
}
