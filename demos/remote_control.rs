//! Remote Control
//!
//! This example drives a handheld remote's key handling through the engine.
//!
//! Key concepts:
//! - Keys pressed while the remote is asleep are deferred until the
//!   backlight comes on
//! - Two edges share KEY_DOWN; the mic state's guard claims the mic key
//! - Keys pressed while the LED blinks are held and replayed afterwards
//! - Diagnostics and dispatch logs go through `tracing`
//!
//! Run with: RUST_LOG=debug cargo run --example remote_control

use deferflow::builder::StateTableBuilder;
use deferflow::core::{Event, EventId, FnHandler};
use deferflow::engine::Machine;
use deferflow::{transitions, EngineConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ACC_MOVEMENT: EventId = EventId::new(1);
const KEY_DOWN: EventId = EventId::new(2);
const KEY_UP: EventId = EventId::new(3);
const BLINK_DONE: EventId = EventId::new(4);
const BACKLIGHT_TIMEOUT: EventId = EventId::new(5);

const MIC_KEY: u8 = 0x4d;

// Hardware the states drive
#[derive(Debug, Default)]
struct Panel {
    backlight: bool,
    mic_open: bool,
    blinks: u32,
    wakeups: u32,
    sent: Vec<u8>,
}

type Handler = FnHandler<u8, Panel>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Remote Control ===\n");

    let mut builder = StateTableBuilder::new();
    let idle = builder.state(
        "Idle",
        Handler::new().on_exit(|_, panel: &mut Panel| panel.wakeups += 1),
    );
    let backlight = builder.state(
        "Backlight",
        Handler::new()
            .on_enter(|_, panel: &mut Panel| panel.backlight = true)
            .on_internal(|_, _| println!("  backlight timer restarted")),
    );
    let mic_key = builder.state(
        "MicKey",
        Handler::new()
            .guard(|event: &Event<u8>, _| event.payload == MIC_KEY)
            .on_enter(|_, panel: &mut Panel| panel.mic_open = true)
            .on_exit(|_, panel: &mut Panel| panel.mic_open = false),
    );
    let key_press = builder.state(
        "KeyPress",
        Handler::new().on_enter(|event: &Event<u8>, panel: &mut Panel| panel.sent.push(event.payload)),
    );
    let blink = builder.state(
        "Blink",
        Handler::new().on_enter(|_, panel: &mut Panel| panel.blinks += 1),
    );
    let sleep = builder.state(
        "Sleep",
        Handler::new().on_enter(|_, panel: &mut Panel| panel.backlight = false),
    );

    transitions! { builder;
        idle => [ACC_MOVEMENT => backlight] defer [KEY_DOWN],
        backlight => [
            ACC_MOVEMENT => backlight,
            KEY_DOWN => mic_key,
            KEY_DOWN => key_press,
            BACKLIGHT_TIMEOUT => sleep,
        ],
        mic_key => [KEY_UP => blink],
        key_press => [KEY_UP => blink],
        blink => [BLINK_DONE => backlight] defer [KEY_DOWN, KEY_UP],
        sleep => [ACC_MOVEMENT => backlight] defer [KEY_DOWN],
    }

    let config = EngineConfig::builder()
        .name("remote")
        .capacity(8)
        .history_limit(32)
        .build()?;
    let mut remote = Machine::new(Arc::new(builder.build()?), config)?;
    remote.init(idle)?;

    let mut panel = Panel::default();

    println!("1. Key pressed while asleep, then the remote is picked up");
    remote.enqueue(KEY_DOWN, 0x12)?;
    remote.enqueue(ACC_MOVEMENT, 0)?;
    let report = remote.process_events(&mut panel)?;
    println!(
        "  state: {:?}, consumed: {}, deferred: {}",
        remote.current_state_name(),
        report.consumed(),
        report.deferred
    );

    println!("\n2. Key released, mic key pressed during the blink");
    remote.enqueue(KEY_UP, 0x12)?;
    remote.enqueue(KEY_DOWN, MIC_KEY)?;
    remote.enqueue(KEY_UP, MIC_KEY)?;
    remote.process_events(&mut panel)?;
    println!(
        "  state: {:?}, waiting: {:?}, blinks: {}",
        remote.current_state_name(),
        remote.pending_deferred(),
        panel.blinks
    );

    println!("\n3. Blink finishes; held keys replay");
    remote.enqueue(BLINK_DONE, 0)?;
    let replay = remote.process_events(&mut panel)?;
    println!(
        "  state: {:?}, replayed: {}, consumed from deferred: {}",
        remote.current_state_name(),
        replay.replayed,
        replay.consumed_deferred
    );

    println!("\n4. Movement keeps the light on, then it times out");
    remote.enqueue(BLINK_DONE, 0)?;
    remote.enqueue(ACC_MOVEMENT, 0)?;
    remote.enqueue(BACKLIGHT_TIMEOUT, 0)?;
    remote.process_events(&mut panel)?;
    println!("  state: {:?}", remote.current_state_name());

    println!("\n5. A key with nowhere to go is reported and dropped");
    remote.enqueue(KEY_UP, 0x12)?;
    let report = remote.process_events(&mut panel)?;
    println!("  dropped: {}", report.dropped);

    println!("\nPath: {}", remote.history().get_path().join(" -> "));
    println!("Panel: {panel:?}");
    println!("\nSnapshot:\n{}", remote.snapshot().to_json()?);

    Ok(())
}
