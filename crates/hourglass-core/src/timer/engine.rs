//! Countdown engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` once per
//! tick interval.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Forward -> Idle    (upper bulb empty, or cancelled)
//! Idle -> Reverse -> Idle    (lower bulb empty, or cancelled)
//! Forward <-> Reverse        (leaves the current state first)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(Sandglass::full(600_000), 5_000);
//! let started = engine.start(Direction::Forward, now_ms);
//! // every 5 s:
//! engine.tick(); // Some(Event::CountdownFinished { .. }) on the last step
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::sandglass::Sandglass;
use crate::events::Event;

/// Which way the sand is flowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Upper bulb drains into the lower one.
    Forward,
    /// Lower bulb drains back into the upper one.
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Forward,
    Reverse,
}

impl CountdownState {
    pub fn direction(self) -> Option<Direction> {
        match self {
            CountdownState::Idle => None,
            CountdownState::Forward => Some(Direction::Forward),
            CountdownState::Reverse => Some(Direction::Reverse),
        }
    }
}

impl From<Direction> for CountdownState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => CountdownState::Forward,
            Direction::Reverse => CountdownState::Reverse,
        }
    }
}

/// Result of a successful start: where the completion alarm must point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Started {
    pub direction: Direction,
    /// Sand left to move in this direction.
    pub duration_ms: i64,
    /// Wall-clock instant (epoch ms) at which the run completes.
    pub fire_at_ms: i64,
}

/// Core countdown engine.
///
/// Owns the single active ticker. The caller drives it with `tick()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownEngine {
    glass: Sandglass,
    state: CountdownState,
    tick_ms: i64,
    /// Ticks applied since the last start.
    #[serde(default)]
    ticks: u32,
}

impl CountdownEngine {
    pub fn new(glass: Sandglass, tick_ms: i64) -> Self {
        Self {
            glass,
            state: CountdownState::Idle,
            tick_ms: tick_ms.max(1),
            ticks: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != CountdownState::Idle
    }

    pub fn glass(&self) -> &Sandglass {
        &self.glass
    }

    pub fn remaining_ms(&self) -> i64 {
        self.glass.remaining_ms()
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.glass.elapsed_ms()
    }

    pub fn tick_ms(&self) -> i64 {
        self.tick_ms
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_ms: self.glass.remaining_ms(),
            elapsed_ms: self.glass.elapsed_ms(),
            capacity_ms: self.glass.capacity_ms(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start flowing in `direction`.
    ///
    /// An active run is left first. Returns `None` when there is no sand to
    /// move that way; the engine then stays idle.
    pub fn start(&mut self, direction: Direction, now_ms: i64) -> Option<Started> {
        if self.is_active() {
            self.cancel();
        }
        let duration_ms = match direction {
            Direction::Forward => self.glass.remaining_ms(),
            Direction::Reverse => self.glass.elapsed_ms(),
        };
        if duration_ms == 0 {
            tracing::debug!(?direction, "nothing to move, staying idle");
            return None;
        }
        self.state = direction.into();
        self.ticks = 0;
        tracing::info!(?direction, duration_ms, "countdown started");
        Some(Started {
            direction,
            duration_ms,
            fire_at_ms: now_ms + duration_ms,
        })
    }

    /// Stop ticking. Idempotent; returns `None` when already idle.
    pub fn cancel(&mut self) -> Option<Event> {
        let direction = self.state.direction()?;
        self.state = CountdownState::Idle;
        tracing::info!(?direction, ticks = self.ticks, "countdown cancelled");
        Some(Event::CountdownCancelled {
            direction,
            remaining_ms: self.glass.remaining_ms(),
            elapsed_ms: self.glass.elapsed_ms(),
            at: Utc::now(),
        })
    }

    /// Apply one tick. Returns `None` while idle, `CountdownTicked` for an
    /// intermediate step and `CountdownFinished` for the step that empties
    /// the draining bulb.
    pub fn tick(&mut self) -> Option<Event> {
        let direction = self.state.direction()?;
        let left = match direction {
            Direction::Forward => {
                self.glass.drain(self.tick_ms);
                self.glass.remaining_ms()
            }
            Direction::Reverse => {
                self.glass.refill(self.tick_ms);
                self.glass.elapsed_ms()
            }
        };
        self.ticks += 1;
        tracing::debug!(
            ?direction,
            remaining_ms = self.glass.remaining_ms(),
            elapsed_ms = self.glass.elapsed_ms(),
            "tick"
        );

        if left == 0 {
            self.state = CountdownState::Idle;
            tracing::info!(?direction, ticks = self.ticks, "countdown finished");
            return Some(Event::CountdownFinished {
                direction,
                ticks: self.ticks,
                at: Utc::now(),
            });
        }
        Some(Event::CountdownTicked {
            direction,
            remaining_ms: self.glass.remaining_ms(),
            elapsed_ms: self.glass.elapsed_ms(),
            at: Utc::now(),
        })
    }

    /// Refill the upper bulb. Cancels any active run.
    pub fn reset(&mut self) -> Option<Event> {
        self.cancel();
        self.glass.reset();
        self.ticks = 0;
        Some(Event::SandglassReset { at: Utc::now() })
    }
}
