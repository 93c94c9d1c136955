use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CountdownState, Direction};

/// Every state change in the system produces an Event.
/// The host prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        direction: Direction,
        duration_ms: i64,
        fire_at_ms: i64,
        at: DateTime<Utc>,
    },
    CountdownTicked {
        direction: Direction,
        remaining_ms: i64,
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    /// The draining bulb is empty.
    CountdownFinished {
        direction: Direction,
        ticks: u32,
        at: DateTime<Utc>,
    },
    CountdownCancelled {
        direction: Direction,
        remaining_ms: i64,
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    SandglassReset {
        at: DateTime<Utc>,
    },
    AlarmArmed {
        fire_at_ms: i64,
        at: DateTime<Utc>,
    },
    AlarmDisarmed {
        at: DateTime<Utc>,
    },
    NotificationPosted {
        id: i32,
        at: DateTime<Utc>,
    },
    /// Permission missing; nothing was shown.
    NotificationSuppressed {
        id: i32,
        at: DateTime<Utc>,
    },
    PermissionRequested {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: CountdownState,
        remaining_ms: i64,
        elapsed_ms: i64,
        capacity_ms: i64,
        at: DateTime<Utc>,
    },
}
