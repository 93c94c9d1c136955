//! The hourglass screen on a terminal.
//!
//! stdin carries one command per line:
//!
//! ```text
//! accel X Y Z          accelerometer sample (also: sensor accel X Y Z)
//! gyro X Y Z           other sensors are accepted and ignored
//! accuracy KIND N      sensor accuracy change
//! start | reset        the two buttons
//! rotate               recreate the screen in the other orientation
//! snapshot             print the instance state
//! status               print the engine state
//! quit                 pause, print the instance state, destroy
//! ```
//!
//! Ctrl-C only pauses: the alarm stays armed for `alarm watch` or
//! `alarm fire-due` to deliver.

use std::time::Duration;

use clap::{Args, ValueEnum};
use hourglass_core::{
    Config, Database, Hourglass, InstanceState, Orientation, SensorEvent, SensorKind,
    SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};

use super::{deliver_due, emit, notifications_allowed};
use crate::surface::TextSurface;

type Screen = Hourglass<Database, TextSurface, SystemClock>;

#[derive(Clone, Copy, ValueEnum)]
pub enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Screen orientation
    #[arg(long, value_enum, default_value = "portrait")]
    orientation: OrientationArg,
    /// Instance state to restore, e.g. '{"iS":true,"tR":true}'
    #[arg(long)]
    restore: Option<String>,
}

enum Flow {
    Continue,
    Rotate,
    Quit,
}

fn handle_line(screen: &mut Screen, line: &str) -> Result<Flow, Box<dyn std::error::Error>> {
    let line = line.trim();
    let line = line.strip_prefix("sensor ").unwrap_or(line);
    let mut words = line.split_whitespace();
    let events = match words.next() {
        None => Vec::new(),
        Some("quit") | Some("exit") => return Ok(Flow::Quit),
        Some("rotate") => return Ok(Flow::Rotate),
        Some("start") => screen.press_start()?,
        Some("reset") => screen.press_reset()?,
        Some("snapshot") => {
            println!("{}", serde_json::to_string(&screen.save_instance_state())?);
            Vec::new()
        }
        Some("status") => vec![screen.snapshot()],
        Some("accuracy") => {
            let kind = words.next().unwrap_or_default().parse::<SensorKind>();
            let accuracy = words.next().unwrap_or_default().parse::<i32>();
            match (kind, accuracy) {
                (Ok(kind), Ok(accuracy)) => screen.on_accuracy_changed(kind, accuracy),
                _ => tracing::warn!("ignoring input: {line}"),
            }
            Vec::new()
        }
        Some(_) => match line.parse::<SensorEvent>() {
            Ok(event) => screen.on_sensor_changed(&event)?,
            Err(e) => {
                tracing::warn!("ignoring input: {e}");
                Vec::new()
            }
        },
    };
    for event in &events {
        emit(event);
    }
    Ok(Flow::Continue)
}

fn other(orientation: Orientation) -> Orientation {
    match orientation {
        Orientation::Portrait => Orientation::Landscape,
        Orientation::Landscape => Orientation::Portrait,
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_screen(args))
}

async fn run_screen(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let channel = config.notification_channel();
    tracing::info!(channel = %channel.id, name = %channel.name, "notification channel registered");

    let saved = args
        .restore
        .as_deref()
        .map(serde_json::from_str::<InstanceState>)
        .transpose()?;

    let mut screen: Screen = Hourglass::create(
        Database::open()?,
        TextSurface::new(config.render.max_sand_px),
        SystemClock,
        &config,
        args.orientation.into(),
        saved,
    )?;
    let allowed = notifications_allowed(screen.backend(), &config);
    if let Some(event) = screen.resume(&allowed) {
        emit(&event);
        tracing::warn!("notifications are off; run `hourglass-cli permission grant` to allow them");
    }
    screen.surface_mut().flush();

    let period = Duration::from_millis(screen.tick_ms().max(1) as u64);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut alarm_check = tokio::time::interval(Duration::from_secs(1));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let was_active = screen.timer_active();
                let flow = match handle_line(&mut screen, &line) {
                    Ok(flow) => flow,
                    Err(e) => {
                        screen.pause()?;
                        screen.destroy()?;
                        return Err(e);
                    }
                };
                match flow {
                    Flow::Continue => {}
                    Flow::Quit => break,
                    Flow::Rotate => {
                        screen.pause()?;
                        let saved = screen.save_instance_state();
                        let orientation = other(screen.orientation());
                        let (db, surface, clock) = screen.destroy()?;
                        screen = Hourglass::create(db, surface, clock, &config, orientation, Some(saved))?;
                        ticker.reset();
                    }
                }
                // A new run ticks relative to its own start.
                if !was_active && screen.timer_active() {
                    ticker.reset();
                }
            }
            _ = ticker.tick() => {
                if let Some(event) = screen.tick() {
                    emit(&event);
                }
            }
            _ = alarm_check.tick() => {
                if let Some(event) = deliver_due(screen.backend(), &config)? {
                    emit(&event);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                screen.pause()?;
                tracing::info!("interrupted; levels saved, alarm left armed");
                return Ok(());
            }
        }
        screen.surface_mut().flush();
    }

    screen.pause()?;
    println!("{}", serde_json::to_string(&screen.save_instance_state())?);
    screen.destroy()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Screen {
        Hourglass::create(
            Database::open_memory().unwrap(),
            TextSurface::new(459),
            SystemClock,
            &Config::default(),
            Orientation::Portrait,
            None,
        )
        .unwrap()
    }

    #[test]
    fn lines_drive_the_screen() {
        let mut screen = screen();
        assert!(matches!(handle_line(&mut screen, "accel 0 9.5 0").unwrap(), Flow::Continue));
        handle_line(&mut screen, "start").unwrap();
        assert!(screen.timer_active());
        handle_line(&mut screen, "sensor accel 9.5 0 0").unwrap();
        assert!(!screen.timer_active());
    }

    #[test]
    fn control_words() {
        let mut screen = screen();
        assert!(matches!(handle_line(&mut screen, "quit").unwrap(), Flow::Quit));
        assert!(matches!(handle_line(&mut screen, "rotate").unwrap(), Flow::Rotate));
        assert!(matches!(handle_line(&mut screen, "   ").unwrap(), Flow::Continue));
        assert!(matches!(handle_line(&mut screen, "wobble").unwrap(), Flow::Continue));
        assert!(handle_line(&mut screen, "accuracy gyro 3").is_ok());
    }

    #[test]
    fn malformed_accuracy_keeps_the_run_going() {
        let mut screen = screen();
        handle_line(&mut screen, "accel 0 9.5 0").unwrap();
        handle_line(&mut screen, "start").unwrap();
        for line in ["accuracy accel high", "accuracy", "accuracy barometer 3"] {
            assert!(matches!(handle_line(&mut screen, line).unwrap(), Flow::Continue));
        }
        assert!(screen.timer_active());
    }

    #[test]
    fn rotation_flips_orientation() {
        assert_eq!(other(Orientation::Portrait), Orientation::Landscape);
        assert_eq!(other(Orientation::Landscape), Orientation::Portrait);
    }
}
