//! Event dispatch: the transition protocol, deferral, and deferred replay.

use crate::config::QueueKind;
use crate::core::{Event, StateDescriptor, TransitionKind, TransitionRecord};
use crate::diagnostics::DiagnosticKind;
use crate::engine::error::EngineError;
use crate::engine::machine::Machine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Summary of one `process_events` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Outer iterations (active pass plus optional replay)
    pub cycles: usize,
    /// Events from the active queue that caused a transition
    pub consumed_active: usize,
    /// Deferred events that caused a transition on replay
    pub consumed_deferred: usize,
    /// Deferred events taken off the queue for another try
    pub replayed: usize,
    /// Events pushed onto the deferred queue (including re-deferrals)
    pub deferred: usize,
    /// Events dropped as unused or because the deferred queue was full
    pub dropped: usize,
}

impl DispatchReport {
    pub fn consumed(&self) -> usize {
        self.consumed_active + self.consumed_deferred
    }
}

/// Result of running the transition protocol for one event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Outcome {
    Consumed,
    /// At least one edge matched but every guard rejected.
    Rejected { rejected: usize },
    Unmatched,
}

impl<P, Env> Machine<P, Env> {
    /// Run the engine until no further progress is possible.
    ///
    /// Drains the active queue, then replays the deferred queue whenever a
    /// pass changed state. Each replay is bounded by the deferred count at
    /// the start of that pass, so an event the current state keeps
    /// deferring is tried once per pass, not forever.
    pub fn process_events(&mut self, env: &mut Env) -> Result<DispatchReport, EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized {
                machine: self.label().to_string(),
            });
        }

        let span = tracing::debug_span!("process_events", machine = self.label());
        let _entered = span.enter();

        let mut report = DispatchReport::default();
        let mut state_changed_by_replay = false;
        loop {
            report.cycles += 1;
            let state_changed = self.drain_active(env, &mut report) || state_changed_by_replay;

            state_changed_by_replay =
                state_changed && !self.deferred.is_empty() && self.replay_deferred(env, &mut report);

            if !state_changed_by_replay {
                break;
            }
        }

        debug!(
            active = self.active.len(),
            deferred = self.deferred.len(),
            consumed = report.consumed(),
            dropped = report.dropped,
            "dispatch complete"
        );
        Ok(report)
    }

    /// Active pass: dequeue until empty. Returns whether any event was consumed.
    fn drain_active(&mut self, env: &mut Env, report: &mut DispatchReport) -> bool {
        let mut consumed = 0;
        while let Some(event) = self.active.dequeue() {
            debug!(event = %event.id, depth = self.active.len(), "dequeue");
            if self.dispatch(&event, env, QueueKind::Active) {
                debug!(event = %event.id, "consumed");
                consumed += 1;
            } else {
                self.defer(event, QueueKind::Active, report);
            }
        }
        report.consumed_active += consumed;
        consumed > 0
    }

    /// Bounded replay pass over the deferred queue.
    fn replay_deferred(&mut self, env: &mut Env, report: &mut DispatchReport) -> bool {
        let budget = self.deferred.len();
        let mut consumed = 0;
        for _ in 0..budget {
            let Some(event) = self.deferred.dequeue() else {
                break;
            };
            report.replayed += 1;
            debug!(event = %event.id, depth = self.deferred.len(), "replaying deferred event");
            if self.dispatch(&event, env, QueueKind::Deferred) {
                consumed += 1;
            } else {
                self.defer(event, QueueKind::Deferred, report);
            }
        }
        report.consumed_deferred += consumed;
        consumed > 0
    }

    /// Run the protocol for one event and report a full guard rejection.
    fn dispatch(&mut self, event: &Event<P>, env: &mut Env, source: QueueKind) -> bool {
        match self.transition(event, env) {
            Outcome::Consumed => true,
            Outcome::Rejected { rejected } => {
                self.report(
                    DiagnosticKind::GuardRejectedAll { rejected },
                    event.id,
                    self.queue(source).len(),
                );
                false
            }
            Outcome::Unmatched => false,
        }
    }

    /// The transition protocol.
    ///
    /// Edges of the current state are scanned in order. A self-loop is
    /// handled internally. Otherwise the target's guard decides; a rejection
    /// moves on to the next edge with the same trigger.
    fn transition(&mut self, event: &Event<P>, env: &mut Env) -> Outcome {
        let table = Arc::clone(&self.table);
        let Some(current) = self.current.and_then(|id| table.get(id)) else {
            return Outcome::Unmatched;
        };

        let mut rejected = 0;
        for edge in current.edges_for(event.id) {
            if edge.target == current.id() {
                debug!(state = %current.label(), event = %event.id, "internal");
                current.handler().internal(event, env);
                self.record(current, current, event, TransitionKind::Internal);
                return Outcome::Consumed;
            }

            let Some(target) = table.get(edge.target) else {
                continue;
            };

            if target.handler().guard(event, env) {
                debug!(state = %current.label(), event = %event.id, "exit");
                current.handler().exit(event, env);
                self.current = Some(target.id());
                debug!(state = %target.label(), event = %event.id, "enter");
                target.handler().enter(event, env);
                self.record(current, target, event, TransitionKind::External);
                return Outcome::Consumed;
            }

            debug!(by = %target.label(), event = %event.id, "event rejected");
            rejected += 1;
        }

        if rejected > 0 {
            Outcome::Rejected { rejected }
        } else {
            Outcome::Unmatched
        }
    }

    /// Deferral decision for an unconsumed event.
    fn defer(&mut self, event: Event<P>, source: QueueKind, report: &mut DispatchReport) {
        let id = event.id;
        let deferrable = self
            .current_descriptor()
            .is_some_and(|state| state.can_defer(id));

        if !deferrable {
            report.dropped += 1;
            self.report(
                DiagnosticKind::UnusedEvent { source },
                id,
                self.queue(source).len(),
            );
            return;
        }

        match self.deferred.enqueue(event) {
            Ok(()) => {
                report.deferred += 1;
                debug!(event = %id, depth = self.deferred.len(), "deferred");
            }
            Err(_) => {
                report.dropped += 1;
                self.report(
                    DiagnosticKind::QueueOverflow {
                        queue: QueueKind::Deferred,
                    },
                    id,
                    self.deferred.len(),
                );
            }
        }
    }

    fn record(
        &mut self,
        from: &StateDescriptor<P, Env>,
        to: &StateDescriptor<P, Env>,
        event: &Event<P>,
        kind: TransitionKind,
    ) {
        if self.history.is_enabled() {
            self.history.record(TransitionRecord::now(
                from.label().into_owned(),
                to.label().into_owned(),
                event.id,
                kind,
            ));
        }
    }
}
