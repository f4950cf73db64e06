//! Property-based tests for queues and dispatch.
//!
//! These tests use proptest to check that the engine's bookkeeping holds
//! for randomly generated tables and event sequences.

use deferflow::core::{Event, EventId, StateHandler, StateId};
use deferflow::diagnostics::NullSink;
use deferflow::engine::{EventQueue, Machine};
use deferflow::{EngineConfig, StateTableBuilder};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

const EVENTS: u16 = 5;

/// Accepts or rejects every transition into its state.
struct Gate(bool);

impl StateHandler<(), ()> for Gate {
    fn guard(&self, _event: &Event, _env: &()) -> bool {
        self.0
    }
}

#[derive(Clone, Debug)]
enum QueueOp {
    Push(u16),
    Pop,
}

#[derive(Clone, Debug)]
struct TableShape {
    accepts: Vec<bool>,
    edges: Vec<(usize, u16, usize)>,
    deferrals: Vec<(usize, u16)>,
}

prop_compose! {
    fn arbitrary_queue_op()(push in any::<bool>(), id in 0..EVENTS) -> QueueOp {
        if push { QueueOp::Push(id) } else { QueueOp::Pop }
    }
}

prop_compose! {
    fn arbitrary_table()(states in 1..5usize)(
        accepts in prop::collection::vec(any::<bool>(), states),
        edges in prop::collection::vec((0..states, 0..EVENTS, 0..states), 0..12),
        deferrals in prop::collection::vec((0..states, 0..EVENTS), 0..8),
    ) -> TableShape {
        TableShape { accepts, edges, deferrals }
    }
}

fn build_machine(shape: &TableShape, active: usize, deferred: usize) -> Machine {
    let mut builder = StateTableBuilder::new();
    let ids: Vec<StateId> = shape
        .accepts
        .iter()
        .map(|accept| builder.unnamed(Gate(*accept)))
        .collect();

    let mut seen = HashSet::new();
    for &(from, trigger, to) in &shape.edges {
        if seen.insert((from, trigger, to)) {
            builder.transition(ids[from], EventId::new(trigger), ids[to]);
        }
    }
    for &(state, event) in &shape.deferrals {
        builder.defer(ids[state], EventId::new(event));
    }

    let config = EngineConfig::builder()
        .active_capacity(active)
        .deferred_capacity(deferred)
        .build()
        .unwrap();
    let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config)
        .unwrap()
        .with_sink(Arc::new(NullSink));
    machine.init(ids[0]).unwrap();
    machine
}

proptest! {
    #[test]
    fn queue_matches_fifo_model(
        capacity in 1..8usize,
        ops in prop::collection::vec(arbitrary_queue_op(), 0..64),
    ) {
        let mut queue = EventQueue::new(capacity);
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                QueueOp::Push(id) => {
                    let accepted = queue.enqueue(Event::new(EventId::new(id), id)).is_ok();
                    prop_assert_eq!(accepted, model.len() < capacity);
                    if accepted {
                        model.push_back(id);
                    }
                }
                QueueOp::Pop => {
                    prop_assert_eq!(queue.dequeue().map(|e| e.payload), model.pop_front());
                }
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert!(queue.len() <= queue.capacity());
        }

        let pending: Vec<u16> = queue.iter().map(|e| e.payload).collect();
        prop_assert_eq!(pending, Vec::from(model));
    }

    #[test]
    fn enqueue_accepts_up_to_capacity(capacity in 1..8usize, count in 0..16usize) {
        let mut builder = StateTableBuilder::<(), ()>::new();
        let only = builder.unnamed(Gate(true));
        builder.internal(only, EventId::new(0));
        let config = EngineConfig::builder().capacity(capacity).build().unwrap();
        let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config)
            .unwrap()
            .with_sink(Arc::new(NullSink));
        machine.init(only).unwrap();

        let accepted = (0..count)
            .filter(|_| machine.enqueue(EventId::new(0), ()).is_ok())
            .count();
        prop_assert_eq!(accepted, count.min(capacity));

        let report = machine.process_events(&mut ()).unwrap();
        prop_assert_eq!(report.consumed_active, accepted);
        prop_assert_eq!(machine.active_len(), 0);
    }

    #[test]
    fn dispatch_accounts_for_every_event(
        shape in arbitrary_table(),
        active in 1..8usize,
        deferred in 1..8usize,
        batches in prop::collection::vec(prop::collection::vec(0..EVENTS, 0..10), 1..4),
    ) {
        let mut machine = build_machine(&shape, active, deferred);

        for batch in batches {
            for id in batch {
                let _ = machine.enqueue(EventId::new(id), ());
            }
            let pending = machine.active_len() + machine.deferred_len();

            let report = machine.process_events(&mut ()).unwrap();

            prop_assert_eq!(machine.active_len(), 0);
            prop_assert!(machine.deferred_len() <= deferred);
            prop_assert_eq!(
                pending,
                report.consumed() + report.dropped + machine.deferred_len()
            );
            prop_assert!(report.cycles <= report.consumed_deferred + 1);
            prop_assert!(machine.current_state().is_some());
        }
    }

    #[test]
    fn deferred_events_keep_relative_order(
        ids in prop::collection::vec(0..EVENTS, 0..12),
    ) {
        let mut builder = StateTableBuilder::<(), ()>::new();
        let waiting = builder.unnamed(Gate(true));
        builder.defer_all(waiting, (0..EVENTS).map(EventId::new));
        let config = EngineConfig::builder().capacity(16).build().unwrap();
        let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config).unwrap();
        machine.init(waiting).unwrap();

        for &id in &ids {
            machine.enqueue(EventId::new(id), ()).unwrap();
        }
        machine.process_events(&mut ()).unwrap();

        let expected: Vec<EventId> = ids.into_iter().map(EventId::new).collect();
        prop_assert_eq!(machine.pending_deferred(), expected);
    }
}
