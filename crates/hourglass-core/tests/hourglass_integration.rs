//! Integration tests for the hourglass screen against a file-backed database.

use std::cell::Cell;
use std::rc::Rc;

use hourglass_core::alarm::COMPLETION_RECEIVER;
use hourglass_core::sensor::ScriptedSource;
use hourglass_core::{
    AlarmClock, Bulb, CompletionReceiver, Config, CountdownState, Database, Direction, Event,
    Hourglass, Notifier, Orientation, PersistentStore, RenderSurface, SandExtent, SensorEvent,
    WallClock,
};

#[derive(Default)]
struct NullSurface;

impl RenderSurface for NullSurface {
    fn set_extent(&mut self, _bulb: Bulb, _extent: SandExtent) {}

    fn request_layout(&mut self, _bulb: Bulb) {}
}

#[derive(Clone)]
struct ManualClock(Rc<Cell<i64>>);

impl WallClock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

fn upright() -> SensorEvent {
    SensorEvent::accelerometer(0.2, 9.7, 0.4)
}

fn inverted() -> SensorEvent {
    SensorEvent::accelerometer(-0.1, -9.7, 0.3)
}

fn on_side() -> SensorEvent {
    SensorEvent::accelerometer(9.6, 0.5, 0.2)
}

#[test]
fn test_full_forward_run_and_out_of_process_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hourglass.db");
    let clock = ManualClock(Rc::new(Cell::new(10_000)));

    let mut hourglass = Hourglass::create(
        Database::open_at(&path).unwrap(),
        NullSurface,
        clock.clone(),
        &Config::default(),
        Orientation::Portrait,
        None,
    )
    .unwrap();

    hourglass.on_sensor_changed(&upright()).unwrap();
    hourglass.press_start().unwrap();
    assert_eq!(hourglass.state(), CountdownState::Forward);

    let mut ticks = 0;
    let mut finished = false;
    while hourglass.timer_active() {
        clock.0.set(clock.0.get() + 5_000);
        if let Some(Event::CountdownFinished { ticks: n, .. }) = hourglass.tick() {
            assert_eq!(n, 120);
            finished = true;
        }
        ticks += 1;
        let glass = hourglass.glass();
        assert_eq!(glass.remaining_ms() + glass.elapsed_ms(), 600_000);
    }
    assert!(finished);
    assert_eq!(ticks, 120);
    assert_eq!(hourglass.glass().remaining_ms(), 0);
    assert_eq!(hourglass.glass().elapsed_ms(), 600_000);

    // The screen goes to the background and the process dies without a
    // destroy: the alarm is still armed in the database.
    hourglass.pause().unwrap();
    drop(hourglass);

    let receiver_db = Database::open_at(&path).unwrap();
    receiver_db.set_notification_permission(true).unwrap();
    let alarm = receiver_db.take_due(610_000).unwrap().unwrap();
    assert_eq!(alarm.receiver, COMPLETION_RECEIVER);
    assert_eq!(alarm.fire_at_ms, 610_000);

    let event = CompletionReceiver
        .on_receive(&alarm, &receiver_db, &receiver_db)
        .unwrap();
    assert!(matches!(event, Event::NotificationPosted { id: 16263, .. }));
    assert_eq!(receiver_db.active().unwrap().len(), 1);

    // The levels written at pause come back on the next launch.
    let relaunched = Hourglass::create(
        receiver_db,
        NullSurface,
        clock,
        &Config::default(),
        Orientation::Portrait,
        None,
    )
    .unwrap();
    assert_eq!(relaunched.glass().remaining_ms(), 0);
    assert!(relaunched.controls().reset_enabled);
    assert!(!relaunched.run_initiated());
}

#[test]
fn test_flip_reverses_the_flow() {
    let clock = ManualClock(Rc::new(Cell::new(0)));
    let mut hourglass = Hourglass::create(
        Database::open_memory().unwrap(),
        NullSurface,
        clock.clone(),
        &Config::default(),
        Orientation::Portrait,
        None,
    )
    .unwrap();

    hourglass.on_sensor_changed(&upright()).unwrap();
    hourglass.press_start().unwrap();
    for _ in 0..10 {
        hourglass.tick();
    }

    // Lay it down, then stand it on its head.
    let mut source = ScriptedSource::new([on_side(), inverted()]);
    clock.0.set(50_000);
    let events = hourglass.pump(&mut source).unwrap();

    assert!(events
        .iter()
        .any(|e| matches!(e, Event::CountdownCancelled { direction: Direction::Forward, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::CountdownStarted {
            direction: Direction::Reverse,
            duration_ms: 50_000,
            fire_at_ms: 100_000,
            ..
        }
    )));
    assert_eq!(hourglass.state(), CountdownState::Reverse);
    assert_eq!(hourglass.backend().armed().unwrap().unwrap().fire_at_ms, 100_000);

    for _ in 0..10 {
        hourglass.tick();
    }
    assert!(!hourglass.timer_active());
    assert!(hourglass.glass().is_full());
}

#[test]
fn test_shake_stops_and_disarms() {
    let mut hourglass = Hourglass::create(
        Database::open_memory().unwrap(),
        NullSurface,
        ManualClock(Rc::new(Cell::new(0))),
        &Config::default(),
        Orientation::Portrait,
        None,
    )
    .unwrap();

    hourglass.on_sensor_changed(&upright()).unwrap();
    hourglass.press_start().unwrap();
    assert!(hourglass.backend().armed().unwrap().is_some());

    hourglass
        .on_sensor_changed(&SensorEvent::accelerometer(-9.0, 9.0, 0.0))
        .unwrap();
    // Upright again right after the stop: rule 1 only runs before rule 2,
    // so the same sample doesn't restart it.
    assert!(!hourglass.timer_active());
    assert!(hourglass.backend().armed().unwrap().is_none());
    assert!(hourglass.tick().is_none());
}

#[test]
fn test_restored_levels_are_rendered_and_reset_enabled() {
    let db = Database::open_memory().unwrap();
    db.put_i64("millisLeftValue", 300_000).unwrap();
    db.put_i64("millisPassedValue", 300_000).unwrap();

    let hourglass = Hourglass::create(
        db,
        NullSurface,
        ManualClock(Rc::new(Cell::new(0))),
        &Config::default(),
        Orientation::Landscape,
        None,
    )
    .unwrap();
    assert_eq!(hourglass.glass().remaining_ms(), 300_000);
    assert_eq!(hourglass.glass().elapsed_ms(), 300_000);
    assert!(hourglass.controls().reset_enabled);
}
