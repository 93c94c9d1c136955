//! Tilt rules.
//!
//! For every accelerometer sample, in this order and against live state:
//!
//! 1. run initiated, idle, upright        -> start forward
//! 2. running, turned onto a side         -> stop and disarm
//! 3. run initiated, idle, upside down    -> start reverse
//!
//! A later rule sees what an earlier rule did to the same sample.

use std::sync::Mutex;

use super::{AccelSample, SensorEvent, SensorKind, TiltThresholds};
use crate::error::Result;
use crate::events::Event;
use crate::timer::Direction;

/// What the listener drives.
pub trait CountdownControl {
    fn run_initiated(&self) -> bool;

    fn timer_active(&self) -> bool;

    fn start_countdown(&mut self, direction: Direction) -> Result<Vec<Event>>;

    /// Cancel the countdown and its alarm.
    fn stop_countdown(&mut self) -> Result<Vec<Event>>;
}

/// Owns the last acceleration sample and applies the tilt rules.
///
/// The mutex is held for the whole of `on_sensor_changed`, so samples are
/// handled one at a time even if the source delivers from several threads.
#[derive(Debug, Default)]
pub struct OrientationListener {
    thresholds: TiltThresholds,
    last: Mutex<Option<AccelSample>>,
}

impl OrientationListener {
    pub fn new(thresholds: TiltThresholds) -> Self {
        Self {
            thresholds,
            last: Mutex::new(None),
        }
    }

    pub fn thresholds(&self) -> TiltThresholds {
        self.thresholds
    }

    pub fn last_sample(&self) -> Option<AccelSample> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn on_sensor_changed<C: CountdownControl + ?Sized>(
        &self,
        event: &SensorEvent,
        control: &mut C,
    ) -> Result<Vec<Event>> {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sample) = event.acceleration() else {
            return Ok(Vec::new());
        };
        *last = Some(sample);

        let mut events = Vec::new();
        let tilt = &self.thresholds;

        if control.run_initiated() && !control.timer_active() && tilt.is_upright(&sample) {
            events.extend(control.start_countdown(Direction::Forward)?);
        }

        if control.timer_active() && tilt.is_on_side(&sample) {
            tracing::info!(x = sample.x, "turned on its side, stopping");
            events.extend(control.stop_countdown()?);
        }

        if control.run_initiated() && !control.timer_active() && tilt.is_inverted(&sample) {
            events.extend(control.start_countdown(Direction::Reverse)?);
        }

        Ok(events)
    }

    pub fn on_accuracy_changed(&self, kind: SensorKind, accuracy: i32) {
        tracing::debug!(%kind, accuracy, "sensor accuracy changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[derive(Default)]
    struct FakeControl {
        initiated: bool,
        active: Option<Direction>,
        starts: Vec<Direction>,
        stops: usize,
    }

    impl CountdownControl for FakeControl {
        fn run_initiated(&self) -> bool {
            self.initiated
        }

        fn timer_active(&self) -> bool {
            self.active.is_some()
        }

        fn start_countdown(&mut self, direction: Direction) -> Result<Vec<Event>> {
            self.active = Some(direction);
            self.starts.push(direction);
            Ok(Vec::new())
        }

        fn stop_countdown(&mut self) -> Result<Vec<Event>> {
            self.active = None;
            self.stops += 1;
            Ok(vec![Event::AlarmDisarmed { at: Utc::now() }])
        }
    }

    fn initiated() -> FakeControl {
        FakeControl {
            initiated: true,
            ..FakeControl::default()
        }
    }

    #[test]
    fn upright_starts_forward() {
        let listener = OrientationListener::default();
        let mut control = initiated();
        listener
            .on_sensor_changed(&SensorEvent::accelerometer(0.0, 9.0, 0.0), &mut control)
            .unwrap();
        assert_eq!(control.starts, vec![Direction::Forward]);
    }

    #[test]
    fn inverted_starts_reverse() {
        let listener = OrientationListener::default();
        let mut control = initiated();
        listener
            .on_sensor_changed(&SensorEvent::accelerometer(0.0, -9.0, 0.0), &mut control)
            .unwrap();
        assert_eq!(control.starts, vec![Direction::Reverse]);
    }

    #[test]
    fn level_starts_nothing() {
        let listener = OrientationListener::default();
        let mut control = initiated();
        listener
            .on_sensor_changed(&SensorEvent::accelerometer(0.0, 0.0, 9.8), &mut control)
            .unwrap();
        assert!(control.starts.is_empty());
        assert_eq!(listener.last_sample().unwrap().z, 9.8);
    }

    #[test]
    fn nothing_starts_before_the_run_is_initiated() {
        let listener = OrientationListener::default();
        let mut control = FakeControl::default();
        listener
            .on_sensor_changed(&SensorEvent::accelerometer(0.0, 9.0, 0.0), &mut control)
            .unwrap();
        assert!(control.starts.is_empty());
    }

    #[test]
    fn side_tilt_stops_and_inverted_side_restarts_reverse() {
        // Rule 3 runs after the stop, so a sample that is both on its side
        // and upside down starts the reverse flow in the same call.
        let listener = OrientationListener::default();
        for (x, y, after) in [
            (9.0, 0.0, None),
            (-9.0, 0.0, None),
            (9.0, 9.0, None),
            (-9.0, -9.0, Some(Direction::Reverse)),
        ] {
            let mut control = initiated();
            control.active = Some(Direction::Forward);
            let events = listener
                .on_sensor_changed(&SensorEvent::accelerometer(x, y, 0.0), &mut control)
                .unwrap();
            assert_eq!(control.stops, 1, "x={x} y={y}");
            assert!(matches!(events[0], Event::AlarmDisarmed { .. }));
            assert_eq!(control.active, after, "x={x} y={y}");
        }
    }

    #[test]
    fn rules_see_earlier_rules_effects() {
        // Rule 1 starts, rule 2 immediately stops, rule 3 does not fire
        // because y is positive.
        let listener = OrientationListener::default();
        let mut control = initiated();
        listener
            .on_sensor_changed(&SensorEvent::accelerometer(9.0, 9.0, 0.0), &mut control)
            .unwrap();
        assert_eq!(control.starts, vec![Direction::Forward]);
        assert_eq!(control.stops, 1);
        assert!(!control.timer_active());
    }

    #[test]
    fn other_sensors_are_ignored() {
        let listener = OrientationListener::default();
        let mut control = initiated();
        let gyro = SensorEvent {
            kind: SensorKind::Gyroscope,
            values: [0.0, 9.0, 0.0],
        };
        let events = listener.on_sensor_changed(&gyro, &mut control).unwrap();
        assert!(events.is_empty());
        assert!(control.starts.is_empty());
        assert!(listener.last_sample().is_none());
    }
}
