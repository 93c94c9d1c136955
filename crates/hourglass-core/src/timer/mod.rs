mod engine;
mod sandglass;

pub use engine::{CountdownEngine, CountdownState, Direction, Started};
pub use sandglass::Sandglass;

/// Ten minutes of sand.
pub const DEFAULT_CAPACITY_MS: i64 = 600_000;

/// Fixed tick interval.
pub const DEFAULT_TICK_MS: i64 = 5_000;
