//! The pair of bulbs.
//!
//! Sand only ever moves between the two bulbs, so `remaining + elapsed`
//! always equals `capacity`.

use serde::{Deserialize, Serialize};

/// Remaining (upper bulb) and elapsed (lower bulb) durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sandglass {
    capacity_ms: i64,
    remaining_ms: i64,
    elapsed_ms: i64,
}

impl Sandglass {
    /// A full upper bulb.
    pub fn full(capacity_ms: i64) -> Self {
        let capacity_ms = capacity_ms.max(0);
        Self {
            capacity_ms,
            remaining_ms: capacity_ms,
            elapsed_ms: 0,
        }
    }

    /// Rebuild from persisted values.
    ///
    /// Values that don't add up to `capacity_ms` (capacity changed, or a
    /// damaged store) are normalized: remaining is clamped into range and
    /// elapsed is derived from it.
    pub fn restore(capacity_ms: i64, remaining_ms: i64, elapsed_ms: i64) -> Self {
        let capacity_ms = capacity_ms.max(0);
        if remaining_ms >= 0
            && elapsed_ms >= 0
            && remaining_ms.checked_add(elapsed_ms) == Some(capacity_ms)
        {
            return Self {
                capacity_ms,
                remaining_ms,
                elapsed_ms,
            };
        }
        let remaining_ms = remaining_ms.clamp(0, capacity_ms);
        tracing::warn!(
            remaining_ms,
            elapsed_ms,
            capacity_ms,
            "stored durations out of balance, normalizing"
        );
        Self {
            capacity_ms,
            remaining_ms,
            elapsed_ms: capacity_ms - remaining_ms,
        }
    }

    pub fn capacity_ms(&self) -> i64 {
        self.capacity_ms
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms
    }

    pub fn is_full(&self) -> bool {
        self.remaining_ms == self.capacity_ms
    }

    /// Move up to `step_ms` from the upper to the lower bulb.
    /// Returns what was actually moved.
    pub fn drain(&mut self, step_ms: i64) -> i64 {
        let moved = step_ms.clamp(0, self.remaining_ms);
        self.remaining_ms -= moved;
        self.elapsed_ms += moved;
        moved
    }

    /// Move up to `step_ms` from the lower back to the upper bulb.
    pub fn refill(&mut self, step_ms: i64) -> i64 {
        let moved = step_ms.clamp(0, self.elapsed_ms);
        self.elapsed_ms -= moved;
        self.remaining_ms += moved;
        moved
    }

    pub fn reset(&mut self) {
        *self = Self::full(self.capacity_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clamps_at_empty() {
        let mut glass = Sandglass::full(7_000);
        assert_eq!(glass.drain(5_000), 5_000);
        assert_eq!(glass.drain(5_000), 2_000);
        assert_eq!(glass.remaining_ms(), 0);
        assert_eq!(glass.elapsed_ms(), 7_000);
        assert_eq!(glass.drain(5_000), 0);
    }

    #[test]
    fn refill_clamps_at_full() {
        let mut glass = Sandglass::restore(10_000, 2_000, 8_000);
        glass.refill(5_000);
        glass.refill(5_000);
        assert!(glass.is_full());
        assert_eq!(glass.elapsed_ms(), 0);
    }

    #[test]
    fn restore_keeps_balanced_values() {
        let glass = Sandglass::restore(600_000, 300_000, 300_000);
        assert_eq!(glass.remaining_ms(), 300_000);
        assert_eq!(glass.elapsed_ms(), 300_000);
    }

    #[test]
    fn restore_normalizes_unbalanced_values() {
        let glass = Sandglass::restore(600_000, 900_000, -5);
        assert_eq!(glass.remaining_ms(), 600_000);
        assert_eq!(glass.elapsed_ms(), 0);

        let glass = Sandglass::restore(300_000, 200_000, 400_000);
        assert_eq!(glass.remaining_ms(), 200_000);
        assert_eq!(glass.elapsed_ms(), 100_000);
    }

    #[test]
    fn restore_survives_extreme_stored_values() {
        let glass = Sandglass::restore(600_000, i64::MAX, 1);
        assert_eq!(glass.remaining_ms(), 600_000);
        assert_eq!(glass.elapsed_ms(), 0);

        let glass = Sandglass::restore(600_000, i64::MAX, i64::MAX);
        assert!(glass.is_full());

        let glass = Sandglass::restore(600_000, i64::MIN, i64::MAX);
        assert_eq!(glass.remaining_ms(), 0);
        assert_eq!(glass.elapsed_ms(), 600_000);
    }
}
