//! Capture of tracing events for assertions on log output.
use std::{
    collections::HashSet,
    fmt,
    sync::Arc,
};

use observability_deps::tracing::{
    self,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
    subscriber::{DefaultGuard, Subscriber},
    Event, Metadata,
};
use parking_lot::Mutex;

/// One captured event, as `(field, value)` pairs in recording order.
///
/// The event level comes first, under the `level` key.
pub type LogLine = Vec<(String, String)>;

type SharedLines = Arc<Mutex<Vec<LogLine>>>;

/// Builder for [`TracingCapture`].
#[derive(Debug, Clone, Default)]
pub struct TracingCaptureBuilder {
    targets: HashSet<&'static str>,
}

impl TracingCaptureBuilder {
    /// Only capture events of `target` (a module path, usually).
    ///
    /// Several targets may be given; events of any of them are captured.
    #[must_use]
    pub fn filter_target(mut self, target: &'static str) -> Self {
        self.targets.insert(target);
        self
    }

    /// Start capturing on the current thread.
    #[must_use]
    pub fn build(self) -> TracingCapture {
        let keep_interest = tracing::Dispatch::new(tracing::subscriber::NoSubscriber::new());
        let lines = SharedLines::default();
        let subscriber = CaptureSubscriber {
            lines: Arc::clone(&lines),
            targets: self.targets,
        };

        TracingCapture {
            lines,
            _guard: tracing::subscriber::set_default(subscriber),
            _keep_interest: keep_interest,
        }
    }
}

/// Captures tracing events emitted on the current thread while it is alive.
///
/// Its [`Display`](fmt::Display) form renders one event per line as
/// `key = value; ` pairs, e.g.
/// `level = WARN; message = cannot decode NDV sketch; partition_name = p1; `.
#[derive(Debug)]
pub struct TracingCapture {
    lines: SharedLines,
    _guard: DefaultGuard,
    /// See <https://github.com/tokio-rs/tracing/issues/2874>.
    _keep_interest: tracing::Dispatch,
}

impl TracingCapture {
    /// Capture every event.
    #[expect(clippy::new_without_default)]
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Capture selected events.
    pub fn builder() -> TracingCaptureBuilder {
        TracingCaptureBuilder::default()
    }

    /// Events captured so far.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }
}

impl fmt::Display for TracingCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (key, value) in line {
                write!(f, "{key} = {value}; ")?;
            }
        }
        Ok(())
    }
}

struct CaptureSubscriber {
    lines: SharedLines,
    targets: HashSet<&'static str>,
}

impl Subscriber for CaptureSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let metadata = event.metadata();
        if !self.targets.is_empty() && !self.targets.contains(metadata.target()) {
            return;
        }

        let mut visitor = LineVisitor::default();
        visitor.push("level", metadata.level().to_string());
        event.record(&mut visitor);

        self.lines.lock().push(visitor.line);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

#[derive(Debug, Default)]
struct LineVisitor {
    line: LogLine,
}

impl LineVisitor {
    fn push(&mut self, key: &str, value: String) {
        self.line.push((key.to_owned(), value));
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field.name(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field.name(), format!("{value:?}"));
    }
}
