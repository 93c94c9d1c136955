use super::ArmedAlarm;
use crate::error::Result;
use crate::events::Event;
use crate::notify::{emit_completion, NotificationPermission, Notifier};

/// Where the completion alarm is delivered.
///
/// Runs without the screen: it builds the notification from nothing but
/// constants, so it works in a fresh process long after the screen died.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionReceiver;

impl CompletionReceiver {
    pub fn on_receive<N, P>(&self, alarm: &ArmedAlarm, notifier: &N, permission: &P) -> Result<Event>
    where
        N: Notifier + ?Sized,
        P: NotificationPermission + ?Sized,
    {
        tracing::info!(fire_at_ms = alarm.fire_at_ms, "completion alarm delivered");
        emit_completion(notifier, permission)
    }
}
