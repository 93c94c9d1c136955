//! # Hourglass Core Library
//!
//! Business logic for a tilt-driven hourglass: ten minutes of sand that
//! flows while the device stands upright, flows back when it is turned
//! upside down, and stops when it is laid on its side.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: a tick-driven state machine (`Idle`, `Forward`,
//!   `Reverse`) over a pair of bulbs; the caller invokes `tick()` every
//!   tick interval
//! - **Orientation Listener**: applies the tilt rules to accelerometer samples
//! - **Alarm / Notification**: the completion alarm and the notification it
//!   triggers, both able to outlive the screen
//! - **Storage**: SQLite for bulb levels, the alarm and shown notifications;
//!   TOML for configuration
//!
//! Platform services are traits ([`PersistentStore`], [`AlarmClock`],
//! [`Notifier`], [`RenderSurface`], [`OrientationSource`]) so the screen can
//! run against the desktop host or against fakes.

pub mod alarm;
pub mod error;
pub mod events;
pub mod notify;
pub mod render;
pub mod screen;
pub mod sensor;
pub mod storage;
pub mod timer;

pub use alarm::{AlarmClock, ArmedAlarm, CompletionReceiver};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use notify::{Notification, NotificationChannel, NotificationPermission, Notifier};
pub use render::{Bulb, Orientation, RenderSurface, SandExtent, SandRenderer};
pub use screen::{Controls, Hourglass, InstanceState, SystemClock, WallClock};
pub use sensor::{AccelSample, OrientationListener, OrientationSource, SensorEvent, SensorKind};
pub use storage::{Config, Database, PersistentStore};
pub use timer::{CountdownEngine, CountdownState, Direction, Sandglass};
