//! TOML-based application configuration.
//!
//! Stores:
//! - Countdown capacity and tick interval
//! - Tilt threshold for the accelerometer rules
//! - Maximum sand extent for the renderer
//! - Notification channel settings
//!
//! Configuration is stored at `~/.config/hourglass/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::notify::{Importance, NotificationChannel};
use crate::render::DEFAULT_MAX_SAND_PX;
use crate::sensor::DEFAULT_TILT_THRESHOLD;
use crate::timer::{DEFAULT_CAPACITY_MS, DEFAULT_TICK_MS};

/// Countdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_initial_ms")]
    pub initial_ms: i64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: i64,
}

/// Accelerometer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// m/s². Axis readings beyond +/- this value count as a tilt or a shake.
    #[serde(default = "default_tilt_threshold")]
    pub tilt_threshold: f32,
}

/// Renderer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_max_sand_px")]
    pub max_sand_px: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
    #[serde(default = "default_channel_description")]
    pub channel_description: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/hourglass/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_initial_ms() -> i64 {
    DEFAULT_CAPACITY_MS
}
fn default_tick_ms() -> i64 {
    DEFAULT_TICK_MS
}
fn default_tilt_threshold() -> f32 {
    DEFAULT_TILT_THRESHOLD
}
fn default_max_sand_px() -> u32 {
    DEFAULT_MAX_SAND_PX
}
fn default_true() -> bool {
    true
}
fn default_channel_name() -> String {
    "Hourglass".into()
}
fn default_channel_description() -> String {
    "Tells you when the upper bulb runs empty".into()
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            initial_ms: default_initial_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            tilt_threshold: default_tilt_threshold(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_sand_px: default_max_sand_px(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_name: default_channel_name(),
            channel_description: default_channel_description(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Reject values the engine and renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown.initial_ms <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "countdown.initial_ms".into(),
                message: "must be positive".into(),
            });
        }
        if self.countdown.tick_ms <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "countdown.tick_ms".into(),
                message: "must be positive".into(),
            });
        }
        if !(self.sensor.tilt_threshold.is_finite() && self.sensor.tilt_threshold > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "sensor.tilt_threshold".into(),
                message: "must be a positive number".into(),
            });
        }
        Ok(())
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// The channel the completion notification is posted on.
    pub fn notification_channel(&self) -> NotificationChannel {
        NotificationChannel {
            id: crate::notify::CHANNEL_ID.to_string(),
            name: self.notifications.channel_name.clone(),
            description: self.notifications.channel_description.clone(),
            importance: Importance::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.countdown.initial_ms, 600_000);
        assert_eq!(parsed.countdown.tick_ms, 5_000);
        assert_eq!(parsed.render.max_sand_px, 459);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[countdown]\ninitial_ms = 60000\n").unwrap();
        assert_eq!(parsed.countdown.initial_ms, 60_000);
        assert_eq!(parsed.countdown.tick_ms, 5_000);
        assert!((parsed.sensor.tilt_threshold - 8.5).abs() < f32::EPSILON);
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("countdown.tick_ms").as_deref(), Some("5000"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("countdown.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("countdown.initial_ms", "120000").unwrap();
        cfg.apply("sensor.tilt_threshold", "7.25").unwrap();
        cfg.apply("notifications.channel_name", "Sand").unwrap();
        assert_eq!(cfg.countdown.initial_ms, 120_000);
        assert!((cfg.sensor.tilt_threshold - 7.25).abs() < f32::EPSILON);
        assert_eq!(cfg.notifications.channel_name, "Sand");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.apply("countdown.nonexistent_key", "1");
        assert!(result.is_err());
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("notifications.enabled", "not_a_bool").is_err());
        assert!(cfg.apply("countdown.tick_ms", "soon").is_err());
    }

    #[test]
    fn apply_rejects_non_positive_tick() {
        let mut cfg = Config::default();
        assert!(cfg.apply("countdown.tick_ms", "0").is_err());
        assert_eq!(cfg.countdown.tick_ms, 5_000);
    }

    #[test]
    fn set_json_value_by_path_rejects_empty_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(Config::set_json_value_by_path(&mut json, "", "1").is_err());
    }

    #[test]
    fn channel_uses_fixed_identity() {
        let channel = Config::default().notification_channel();
        assert_eq!(channel.id, "hourglassChannel");
        assert_eq!(channel.importance, Importance::High);
    }
}
