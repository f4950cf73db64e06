//! Macros for ergonomic state table construction.

/// Add many edges to a [`StateTableBuilder`](crate::builder::StateTableBuilder)
/// in one block.
///
/// Each source state lists its edges in priority order. An optional
/// `defer [...]` clause lists the events the state may hold for replay.
///
/// # Example
///
/// ```
/// use deferflow::builder::StateTableBuilder;
/// use deferflow::core::{EventId, NoopHandler};
/// use deferflow::transitions;
///
/// const ACC_MOVEMENT: EventId = EventId::new(1);
/// const KEY_DOWN: EventId = EventId::new(2);
/// const BACKLIGHT_OFF: EventId = EventId::new(3);
///
/// let mut builder = StateTableBuilder::<(), ()>::new();
/// let idle = builder.state("Idle", NoopHandler);
/// let backlight = builder.state("Backlight", NoopHandler);
/// let first_key = builder.state("FirstKey", NoopHandler);
/// let mic_key = builder.state("MicKey", NoopHandler);
///
/// transitions! { builder;
///     idle => [ACC_MOVEMENT => backlight],
///     backlight => [
///         BACKLIGHT_OFF => idle,
///         KEY_DOWN => first_key,
///         KEY_DOWN => mic_key,
///     ],
///     first_key => [] defer [KEY_DOWN],
/// }
///
/// let table = builder.build().unwrap();
/// assert_eq!(table.get(backlight).unwrap().edges().len(), 3);
/// assert!(table.get(first_key).unwrap().can_defer(KEY_DOWN));
/// ```
#[macro_export]
macro_rules! transitions {
    (
        $builder:expr;
        $(
            $from:expr => [ $( $trigger:expr => $to:expr ),* $(,)? ]
            $( defer [ $( $deferred:expr ),* $(,)? ] )?
        ),* $(,)?
    ) => {{
        let builder = &mut $builder;
        $(
            $( builder.transition($from, $trigger, $to); )*
            $( $( builder.defer($from, $deferred); )* )?
        )*
    }};
}
