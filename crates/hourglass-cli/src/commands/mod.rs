pub mod alarm;
pub mod config;
pub mod notification;
pub mod permission;
pub mod run;
pub mod status;

use hourglass_core::alarm::now_ms;
use hourglass_core::{AlarmClock, CompletionReceiver, Config, CoreError, Database, Event, NotificationPermission};

/// Print one event as a JSON line on stdout.
pub(crate) fn emit(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!("cannot encode event: {e}"),
    }
}

/// Permission as the receiver sees it: granted by the user and not switched
/// off in the configuration.
pub(crate) fn notifications_allowed(db: &Database, config: &Config) -> bool {
    config.notifications.enabled && db.is_granted()
}

/// Deliver the completion alarm if it is due. Returns the receiver's event.
pub(crate) fn deliver_due(db: &Database, config: &Config) -> Result<Option<Event>, CoreError> {
    let Some(alarm) = db.take_due(now_ms())? else {
        return Ok(None);
    };
    let allowed = notifications_allowed(db, config);
    let event = CompletionReceiver.on_receive(&alarm, db, &allowed)?;
    Ok(Some(event))
}
