//! Property tests: sand is never created or destroyed.

use hourglass_core::{CountdownEngine, Direction, Sandglass};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Start(Direction),
    Tick,
    Cancel,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Start(Direction::Forward)),
        Just(Step::Start(Direction::Reverse)),
        Just(Step::Tick),
        Just(Step::Tick),
        Just(Step::Tick),
        Just(Step::Cancel),
    ]
}

proptest! {
    #[test]
    fn sum_is_constant_for_any_sequence(
        capacity in 1i64..2_000_000,
        tick in 1i64..20_000,
        steps in prop::collection::vec(step(), 0..400),
    ) {
        let mut engine = CountdownEngine::new(Sandglass::full(capacity), tick);
        for step in steps {
            match step {
                Step::Start(direction) => { engine.start(direction, 0); }
                Step::Tick => { engine.tick(); }
                Step::Cancel => { engine.cancel(); }
            }
            prop_assert!(engine.remaining_ms() >= 0);
            prop_assert!(engine.elapsed_ms() >= 0);
            prop_assert_eq!(engine.remaining_ms() + engine.elapsed_ms(), capacity);
        }
    }

    #[test]
    fn forward_run_takes_ceil_capacity_over_tick(
        capacity in 1i64..1_000_000,
        tick in 1i64..50_000,
    ) {
        let mut engine = CountdownEngine::new(Sandglass::full(capacity), tick);
        prop_assert!(engine.start(Direction::Forward, 0).is_some());
        let mut ticks = 0i64;
        while engine.is_active() {
            engine.tick();
            ticks += 1;
        }
        prop_assert_eq!(ticks, (capacity + tick - 1) / tick);
        prop_assert_eq!(engine.remaining_ms(), 0);
        prop_assert_eq!(engine.elapsed_ms(), capacity);
    }
}
