//! Accelerometer input.
//!
//! Samples arrive as [`SensorEvent`]s from an [`OrientationSource`]. Only
//! accelerometer events carry orientation; everything else is filtered out
//! by the [`OrientationListener`].

mod listener;

pub use listener::{CountdownControl, OrientationListener};

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::Direction;

/// m/s². Just under standard gravity, so only a near-vertical axis exceeds it.
pub const DEFAULT_TILT_THRESHOLD: f32 = 8.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    MagneticField,
    Light,
}

impl FromStr for SensorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accel" | "accelerometer" => Ok(SensorKind::Accelerometer),
            "gyro" | "gyroscope" => Ok(SensorKind::Gyroscope),
            "mag" | "magnetic_field" => Ok(SensorKind::MagneticField),
            "light" => Ok(SensorKind::Light),
            other => Err(ValidationError::Parse {
                input: other.to_string(),
                message: "unknown sensor kind".into(),
            }),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::MagneticField => "magnetic_field",
            SensorKind::Light => "light",
        };
        f.write_str(name)
    }
}

/// One reading from some sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub values: [f32; 3],
}

impl SensorEvent {
    pub fn accelerometer(x: f32, y: f32, z: f32) -> Self {
        Self {
            kind: SensorKind::Accelerometer,
            values: [x, y, z],
        }
    }

    /// The acceleration sample, if this is an accelerometer event.
    pub fn acceleration(&self) -> Option<AccelSample> {
        match self.kind {
            SensorKind::Accelerometer => Some(AccelSample {
                x: self.values[0],
                y: self.values[1],
                z: self.values[2],
            }),
            _ => None,
        }
    }
}

/// Parses `KIND X Y Z`, e.g. `accel 0.1 9.6 0.3`.
impl FromStr for SensorEvent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = |message: &str| ValidationError::Parse {
            input: s.to_string(),
            message: message.to_string(),
        };
        let mut parts = s.split_whitespace();
        let kind: SensorKind = parts.next().ok_or_else(|| parse_error("empty line"))?.parse()?;

        let mut values = [0.0f32; 3];
        for value in &mut values {
            *value = parts
                .next()
                .ok_or_else(|| parse_error("expected three axis values"))?
                .parse()
                .map_err(|_| parse_error("axis value is not a number"))?;
        }
        if parts.next().is_some() {
            return Err(parse_error("expected three axis values"));
        }
        Ok(Self { kind, values })
    }
}

/// Acceleration on the device axes, m/s².
/// `x` is axis 0 (short edge), `y` axis 1 (long edge), `z` axis 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Tilt classification against a single symmetric threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltThresholds {
    pub threshold: f32,
}

impl Default for TiltThresholds {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_TILT_THRESHOLD,
        }
    }
}

impl TiltThresholds {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Standing on its base: gravity along +y.
    pub fn is_upright(&self, sample: &AccelSample) -> bool {
        sample.y > self.threshold
    }

    /// Standing on its head.
    pub fn is_inverted(&self, sample: &AccelSample) -> bool {
        sample.y < -self.threshold
    }

    /// Turned onto either long side.
    pub fn is_on_side(&self, sample: &AccelSample) -> bool {
        sample.x > self.threshold || sample.x < -self.threshold
    }

    /// Direction the sand would flow for this sample, if any.
    pub fn flow(&self, sample: &AccelSample) -> Option<Direction> {
        if self.is_upright(sample) {
            Some(Direction::Forward)
        } else if self.is_inverted(sample) {
            Some(Direction::Reverse)
        } else {
            None
        }
    }
}

/// A stream of sensor events.
pub trait OrientationSource {
    fn next_event(&mut self) -> Option<SensorEvent>;
}

/// Replays a fixed list of events.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    events: VecDeque<SensorEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = SensorEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl OrientationSource for ScriptedSource {
    fn next_event(&mut self) -> Option<SensorEvent> {
        self.events.pop_front()
    }
}
