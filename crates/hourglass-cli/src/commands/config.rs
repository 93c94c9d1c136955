use clap::Subcommand;
use hourglass_core::Config;
use serde_json::Value;

/// Keys: countdown.initial_ms, countdown.tick_ms, sensor.tilt_threshold,
/// render.max_sand_px, notifications.enabled, notifications.channel_name,
/// notifications.channel_description.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key, e.g. "countdown.tick_ms" or "sensor.tilt_threshold"
        key: String,
    },
    /// Change one setting; takes effect on the next `run`
    Set {
        key: String,
        value: String,
    },
    /// Print every setting as `key = value`
    List,
    /// Restore the ten-minute glass, 5 s ticks and 8.5 m/s² threshold
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => match Config::load()?.get(&key) {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            tracing::info!(%key, %value, "config updated");
            println!("ok");
        }
        ConfigAction::List => {
            let mut lines = Vec::new();
            flatten("", &serde_json::to_value(Config::load()?)?, &mut lines);
            for line in lines {
                println!("{line}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten(&key, child, out);
            }
        }
        other => out.push(format!("{prefix} = {other}")),
    }
}
