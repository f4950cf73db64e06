//! End-to-end dispatch scenarios through the public API.

use deferflow::{
    CollectingSink, DiagnosticKind, EngineConfig, EngineError, Event, EventId, FnHandler, Machine,
    QueueKind, StateId, StateTableBuilder,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const W: EventId = EventId::new(1);
const X: EventId = EventId::new(2);
const Y: EventId = EventId::new(3);
const Z: EventId = EventId::new(4);

type Log = Vec<String>;

/// Handler that logs every action under `name` and answers its guard with `accept`.
fn logging(name: &'static str, accept: bool, guards: Arc<AtomicUsize>) -> FnHandler<(), Log> {
    FnHandler::new()
        .guard(move |_: &Event, _: &Log| {
            guards.fetch_add(1, Ordering::SeqCst);
            accept
        })
        .on_enter(move |_, log| log.push(format!("enter {name}")))
        .on_exit(move |_, log| log.push(format!("exit {name}")))
        .on_internal(move |_, log| log.push(format!("internal {name}")))
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn start(
    builder: StateTableBuilder<(), Log>,
    initial: StateId,
    config: EngineConfig,
) -> (Machine<(), Log>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config)
        .unwrap()
        .with_sink(sink.clone());
    machine.init(initial).unwrap();
    (machine, sink)
}

#[test]
fn guard_rejection_falls_back_to_next_target() {
    let b_guard = counter();
    let mut builder = StateTableBuilder::new();
    let a = builder.state("A", logging("A", true, counter()));
    let b = builder.state("B", logging("B", false, b_guard.clone()));
    let c = builder.state("C", logging("C", true, counter()));
    builder.transition(a, X, b).transition(a, X, c);
    let (mut machine, sink) = start(builder, a, EngineConfig::default());

    machine.enqueue(X, ()).unwrap();
    let mut log = Log::new();
    machine.process_events(&mut log).unwrap();

    assert!(machine.is_in_state(c));
    assert_eq!(log, vec!["exit A", "enter C"]);
    assert_eq!(b_guard.load(Ordering::SeqCst), 1);
    assert!(sink.is_empty());
}

#[test]
fn self_loop_runs_internal_action_only() {
    let mut builder = StateTableBuilder::new();
    let a = builder.state("A", logging("A", true, counter()));
    builder.internal(a, Y);
    let (mut machine, _) = start(builder, a, EngineConfig::default());

    machine.enqueue(Y, ()).unwrap();
    let mut log = Log::new();
    machine.process_events(&mut log).unwrap();

    assert!(machine.is_in_state(a));
    assert_eq!(log, vec!["internal A"]);
}

#[test]
fn full_active_queue_drops_newest_event() {
    let mut builder = StateTableBuilder::<u16, Vec<u16>>::new();
    let a = builder.state(
        "A",
        FnHandler::<u16, Vec<u16>>::new().on_internal(|event, seen| seen.push(event.payload)),
    );
    builder.internal(a, Y);
    let sink = Arc::new(CollectingSink::new());
    let config = EngineConfig::builder().capacity(4).build().unwrap();
    let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config)
        .unwrap()
        .with_sink(sink.clone());
    machine.init(a).unwrap();

    for payload in 1..=4 {
        machine.enqueue(Y, payload).unwrap();
    }
    let err = machine.enqueue(Y, 5).unwrap_err();
    assert!(matches!(
        err,
        EngineError::QueueOverflow {
            queue: QueueKind::Active,
            capacity: 4,
            ..
        }
    ));
    assert_eq!(machine.active_len(), 4);

    let mut seen = Vec::new();
    let report = machine.process_events(&mut seen).unwrap();

    assert_eq!(report.consumed_active, 4);
    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert_eq!(machine.active_len(), 0);
    assert_eq!(
        sink.kinds(),
        vec![DiagnosticKind::QueueOverflow {
            queue: QueueKind::Active
        }]
    );
}

#[test]
fn deferred_event_fires_after_unlocking_transition() {
    let mut builder = StateTableBuilder::new();
    let a = builder.state("A", logging("A", true, counter()));
    let b = builder.state("B", logging("B", true, counter()));
    let d = builder.state("D", logging("D", true, counter()));
    builder.defer(a, Z).transition(a, W, b).transition(b, Z, d);
    let (mut machine, sink) = start(builder, a, EngineConfig::default());

    machine.enqueue(Z, ()).unwrap();
    machine.enqueue(W, ()).unwrap();
    let mut log = Log::new();
    machine.process_events(&mut log).unwrap();

    assert!(machine.is_in_state(d));
    assert_eq!(log, vec!["exit A", "enter B", "exit B", "enter D"]);
    assert_eq!(machine.deferred_len(), 0);
    assert!(sink.is_empty());
}

#[test]
fn replay_of_rejected_events_terminates() {
    let never_guard = counter();
    let mut builder = StateTableBuilder::new();
    let a = builder.state("A", logging("A", true, counter()));
    let b = builder.state("B", logging("B", true, counter()));
    let never = builder.state("Never", logging("Never", false, never_guard.clone()));
    builder
        .defer(a, Z)
        .transition(a, W, b)
        .defer(b, Z)
        .transition(b, Z, never);
    let (mut machine, sink) = start(builder, a, EngineConfig::default());

    for _ in 0..5 {
        machine.enqueue(Z, ()).unwrap();
    }
    machine.enqueue(W, ()).unwrap();
    let report = machine.process_events(&mut Log::new()).unwrap();

    assert!(machine.is_in_state(b));
    assert_eq!(report.replayed, 5);
    assert_eq!(never_guard.load(Ordering::SeqCst), 5);
    assert_eq!(machine.deferred_len(), 5);
    assert_eq!(
        sink.count(|k| matches!(k, DiagnosticKind::GuardRejectedAll { rejected: 1 })),
        5
    );

    // Nothing new happened, so the next call leaves the deferred queue alone.
    let report = machine.process_events(&mut Log::new()).unwrap();
    assert_eq!(report.replayed, 0);
    assert_eq!(never_guard.load(Ordering::SeqCst), 5);
}

#[test]
fn events_before_init_are_dropped() {
    let mut builder = StateTableBuilder::<(), Log>::new();
    builder.state("A", logging("A", true, counter()));
    let sink = Arc::new(CollectingSink::new());
    let config = EngineConfig::builder().name("late").build().unwrap();
    let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config)
        .unwrap()
        .with_sink(sink.clone());

    assert!(machine.enqueue(W, ()).is_err());
    assert!(machine.process_events(&mut Log::new()).is_err());

    let reported = sink.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].kind, DiagnosticKind::NotInitialized);
    assert_eq!(reported[0].machine_name.as_deref(), Some("late"));
}

#[test]
fn payload_reaches_guard_and_actions() {
    let mut builder = StateTableBuilder::<u8, Vec<u8>>::new();
    let idle = builder.state("Idle", FnHandler::<u8, Vec<u8>>::new());
    let small = builder.state(
        "Small",
        FnHandler::<u8, Vec<u8>>::new()
            .guard(|event, _| event.payload < 10)
            .on_enter(|event, seen| seen.push(event.payload)),
    );
    let large = builder.state(
        "Large",
        FnHandler::<u8, Vec<u8>>::new().on_enter(|event, seen| seen.push(event.payload * 2)),
    );
    builder
        .transition(idle, X, small)
        .transition(idle, X, large)
        .transition(small, W, idle)
        .transition(large, W, idle);
    let mut machine = Machine::with_defaults(Arc::new(builder.build().unwrap()));
    machine.init(idle).unwrap();

    let mut seen = Vec::new();
    machine.enqueue(X, 3).unwrap();
    machine.process_events(&mut seen).unwrap();
    assert!(machine.is_in_state(small));

    machine.enqueue(W, 0).unwrap();
    machine.enqueue(X, 40).unwrap();
    machine.process_events(&mut seen).unwrap();

    assert!(machine.is_in_state(large));
    assert_eq!(seen, vec![3, 80]);
}

#[test]
fn machines_sharing_a_table_run_independently() {
    let mut builder = StateTableBuilder::new();
    let a = builder.state("A", logging("A", true, counter()));
    let b = builder.state("B", logging("B", true, counter()));
    builder.transition(a, W, b).transition(b, W, a);
    let table = Arc::new(builder.build().unwrap());

    let mut first: Machine<(), Log> = Machine::with_defaults(Arc::clone(&table));
    let mut second: Machine<(), Log> = Machine::with_defaults(table);
    first.init(a).unwrap();
    second.init(a).unwrap();

    first.enqueue(W, ()).unwrap();
    first.process_events(&mut Log::new()).unwrap();

    assert!(first.is_in_state(b));
    assert!(second.is_in_state(a));
}
