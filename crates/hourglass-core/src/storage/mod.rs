mod config;
pub mod database;
mod prefs;

pub use config::{Config, CountdownConfig, NotificationsConfig, RenderConfig, SensorConfig};
pub use database::Database;
pub use prefs::{load_sandglass, save_sandglass, PersistentStore, KEY_MILLIS_LEFT, KEY_MILLIS_PASSED};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/hourglass[-dev]/` based on HOURGLASS_ENV.
///
/// Set HOURGLASS_ENV=dev to use development data directory.
/// HOURGLASS_HOME, when set, overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HOURGLASS_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HOURGLASS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("hourglass-dev")
            } else {
                base_dir.join("hourglass")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
