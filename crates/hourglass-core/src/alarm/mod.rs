//! Completion alarm.
//!
//! A single one-shot alarm, keyed by the receiver it is delivered to. Arming
//! replaces whatever was armed before for the same receiver, so callers never
//! need to disarm first. The alarm lives outside the screen (in the database
//! for [`Database`]) so it can be delivered after the screen is gone.

mod receiver;

pub use receiver::CompletionReceiver;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Database;

/// Identity of the completion receiver. Every arm/disarm targets this key.
pub const COMPLETION_RECEIVER: &str = "hourglass.completion";

/// An armed alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedAlarm {
    pub receiver: String,
    /// Wall-clock instant, epoch milliseconds.
    pub fire_at_ms: i64,
    pub armed_at: DateTime<Utc>,
}

impl ArmedAlarm {
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.fire_at_ms <= now_ms
    }
}

/// Schedules the wake-capable completion alarm.
pub trait AlarmClock {
    /// Arm (or re-arm) the completion alarm for `fire_at_ms`.
    fn arm(&self, fire_at_ms: i64) -> Result<()>;

    /// Remove the armed alarm. No-op when nothing is armed.
    fn disarm(&self) -> Result<()>;

    fn armed(&self) -> Result<Option<ArmedAlarm>>;

    /// Remove and return the alarm if it is due at `now_ms`.
    /// A given arming is handed out at most once.
    fn take_due(&self, now_ms: i64) -> Result<Option<ArmedAlarm>>;
}

impl AlarmClock for Database {
    fn arm(&self, fire_at_ms: i64) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO alarms (receiver, fire_at_ms, armed_at) VALUES (?1, ?2, ?3)",
            params![COMPLETION_RECEIVER, fire_at_ms, Utc::now().to_rfc3339()],
        )?;
        tracing::info!(fire_at_ms, "alarm armed");
        Ok(())
    }

    fn disarm(&self) -> Result<()> {
        let removed = self.conn().execute(
            "DELETE FROM alarms WHERE receiver = ?1",
            params![COMPLETION_RECEIVER],
        )?;
        if removed > 0 {
            tracing::info!("alarm disarmed");
        }
        Ok(())
    }

    fn armed(&self) -> Result<Option<ArmedAlarm>> {
        let row = self
            .conn()
            .query_row(
                "SELECT receiver, fire_at_ms, armed_at FROM alarms WHERE receiver = ?1",
                params![COMPLETION_RECEIVER],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(receiver, fire_at_ms, armed_at)| ArmedAlarm {
            receiver,
            fire_at_ms,
            armed_at: DateTime::parse_from_rfc3339(&armed_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }))
    }

    fn take_due(&self, now_ms: i64) -> Result<Option<ArmedAlarm>> {
        let Some(alarm) = self.armed()? else {
            return Ok(None);
        };
        if !alarm.is_due(now_ms) {
            return Ok(None);
        }
        // Only the process whose delete hits the row delivers it.
        let removed = self.conn().execute(
            "DELETE FROM alarms WHERE receiver = ?1 AND fire_at_ms = ?2",
            params![alarm.receiver, alarm.fire_at_ms],
        )?;
        Ok((removed == 1).then_some(alarm))
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_then_disarm() {
        let db = Database::open_memory().unwrap();
        assert!(db.armed().unwrap().is_none());
        db.arm(1_000).unwrap();
        let alarm = db.armed().unwrap().unwrap();
        assert_eq!(alarm.receiver, COMPLETION_RECEIVER);
        assert_eq!(alarm.fire_at_ms, 1_000);
        db.disarm().unwrap();
        assert!(db.armed().unwrap().is_none());
    }

    #[test]
    fn disarm_without_alarm_is_fine() {
        let db = Database::open_memory().unwrap();
        db.disarm().unwrap();
        db.disarm().unwrap();
    }

    #[test]
    fn rearm_replaces() {
        let db = Database::open_memory().unwrap();
        db.arm(1_000).unwrap();
        db.arm(9_000).unwrap();
        assert_eq!(db.armed().unwrap().unwrap().fire_at_ms, 9_000);
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM alarms", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn take_due_delivers_once() {
        let db = Database::open_memory().unwrap();
        db.arm(5_000).unwrap();
        assert!(db.take_due(4_999).unwrap().is_none());
        assert!(db.armed().unwrap().is_some());
        assert_eq!(db.take_due(5_000).unwrap().unwrap().fire_at_ms, 5_000);
        assert!(db.take_due(6_000).unwrap().is_none());
        assert!(db.armed().unwrap().is_none());
    }
}
