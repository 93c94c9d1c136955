use hourglass_core::storage::load_sandglass;
use hourglass_core::{
    AlarmClock, Bulb, Config, Database, Hourglass, Notifier, Orientation, RenderSurface,
    SandExtent, SystemClock,
};
use serde_json::json;

use super::{emit, notifications_allowed};

/// Surface for commands that never draw.
struct Headless;

impl RenderSurface for Headless {
    fn set_extent(&mut self, _bulb: Bulb, _extent: SandExtent) {}

    fn request_layout(&mut self, _bulb: Bulb) {}
}

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let glass = load_sandglass(&db, config.countdown.initial_ms)?;

    let status = json!({
        "remaining_ms": glass.remaining_ms(),
        "elapsed_ms": glass.elapsed_ms(),
        "capacity_ms": glass.capacity_ms(),
        "alarm": db.armed()?,
        "notifications_allowed": notifications_allowed(&db, &config),
        "notifications_shown": db.active()?.len(),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// The Reset button, outside a running screen.
pub fn reset() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut screen = Hourglass::create(
        Database::open()?,
        Headless,
        SystemClock,
        &config,
        Orientation::Portrait,
        None,
    )?;
    let events = screen.press_reset()?;
    if events.is_empty() {
        println!("upper bulb already full");
        return Ok(());
    }
    for event in &events {
        emit(event);
    }
    // An interrupted `run` may have left its alarm armed.
    screen.backend().disarm()?;
    screen.pause()?;
    Ok(())
}
