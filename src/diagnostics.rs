//! Reporting of dropped and rejected events.
//!
//! The engine never fails on a bad event; it drops it and tells the
//! machine's [`DiagnosticSink`]. Sinks are injected per machine, so a
//! device can route conditions to its logger, a telemetry counter, or an
//! in-memory list during tests.

use crate::config::QueueKind;
use crate::core::EventId;
use crate::engine::MachineId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// The condition being reported.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A queue was full; the event was dropped.
    QueueOverflow { queue: QueueKind },

    /// An event was enqueued before `init`; it was dropped.
    NotInitialized,

    /// Every edge matching the event had its guard reject. The event is
    /// then deferred or dropped like any other unconsumed event.
    GuardRejectedAll { rejected: usize },

    /// The event matched no edge and the current state does not defer it.
    UnusedEvent { source: QueueKind },
}

/// One reported condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub machine: MachineId,
    pub machine_name: Option<String>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub event: EventId,
    /// Depth of the queue involved at the time of the report
    pub queue_depth: usize,
    /// Label of the current state, if the machine has one
    pub state: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Destination for diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Sink that forwards to `tracing`. This is the default for new machines.
///
/// Overflow and not-initialized are errors, unused events are warnings,
/// and guard rejections are debug noise.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: &Diagnostic) {
        let machine = d.machine_name.as_deref().unwrap_or("-");
        let state = d.state.as_deref().unwrap_or("-");
        match d.kind {
            DiagnosticKind::QueueOverflow { queue } => tracing::error!(
                machine,
                machine_id = %d.machine,
                event = %d.event,
                %queue,
                depth = d.queue_depth,
                "event queue full, dropping event"
            ),
            DiagnosticKind::NotInitialized => tracing::error!(
                machine,
                machine_id = %d.machine,
                event = %d.event,
                depth = d.queue_depth,
                "machine not initialized, dropping event"
            ),
            DiagnosticKind::GuardRejectedAll { rejected } => tracing::debug!(
                machine,
                event = %d.event,
                state,
                rejected,
                "every matching guard rejected the event"
            ),
            DiagnosticKind::UnusedEvent { source } => tracing::warn!(
                machine,
                machine_id = %d.machine,
                event = %d.event,
                state,
                %source,
                depth = d.queue_depth,
                "event unused"
            ),
        }
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Sink that keeps every diagnostic in memory.
///
/// # Example
///
/// ```rust
/// use deferflow::diagnostics::{CollectingSink, DiagnosticKind};
///
/// let sink = CollectingSink::new();
/// assert!(sink.is_empty());
/// assert_eq!(sink.count(|kind| matches!(kind, DiagnosticKind::NotInitialized)), 0);
/// ```
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Remove and return everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.lock().iter().map(|d| d.kind).collect()
    }

    /// Count diagnostics whose kind satisfies `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&DiagnosticKind) -> bool,
    {
        self.lock().iter().filter(|d| predicate(&d.kind)).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.lock().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(kind: DiagnosticKind) -> Diagnostic {
        Diagnostic {
            machine: MachineId::new(),
            machine_name: Some("remote".into()),
            kind,
            event: EventId::new(5),
            queue_depth: 2,
            state: Some("Idle".into()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn collecting_sink_records_in_order() {
        let sink = CollectingSink::new();
        sink.report(&diagnostic(DiagnosticKind::NotInitialized));
        sink.report(&diagnostic(DiagnosticKind::UnusedEvent {
            source: QueueKind::Active,
        }));

        assert_eq!(
            sink.kinds(),
            vec![
                DiagnosticKind::NotInitialized,
                DiagnosticKind::UnusedEvent {
                    source: QueueKind::Active
                },
            ]
        );
    }

    #[test]
    fn take_drains_the_sink() {
        let sink = CollectingSink::new();
        sink.report(&diagnostic(DiagnosticKind::NotInitialized));

        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn count_filters_by_kind() {
        let sink = CollectingSink::new();
        for _ in 0..3 {
            sink.report(&diagnostic(DiagnosticKind::QueueOverflow {
                queue: QueueKind::Deferred,
            }));
        }
        sink.report(&diagnostic(DiagnosticKind::GuardRejectedAll { rejected: 2 }));

        assert_eq!(
            sink.count(|k| matches!(k, DiagnosticKind::QueueOverflow { .. })),
            3
        );
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn null_and_tracing_sinks_accept_reports() {
        let d = diagnostic(DiagnosticKind::UnusedEvent {
            source: QueueKind::Deferred,
        });
        NullSink.report(&d);
        TracingSink.report(&d);
    }

    #[test]
    fn diagnostic_serializes_with_flat_kind() {
        let d = diagnostic(DiagnosticKind::QueueOverflow {
            queue: QueueKind::Active,
        });
        let json = serde_json::to_value(&d).unwrap();

        assert_eq!(json["kind"], "queue_overflow");
        assert_eq!(json["queue"], "active");
        assert_eq!(json["event"], 5);
        assert_eq!(json["queue_depth"], 2);

        let back: Diagnostic = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
