use std::time::Duration;

use clap::Subcommand;
use hourglass_core::alarm::now_ms;
use hourglass_core::{AlarmClock, Config, Database};

use super::{deliver_due, emit};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Print the armed alarm as JSON
    Show,
    /// Disarm the alarm
    Cancel,
    /// Deliver the alarm if it is due (for cron or a systemd timer)
    FireDue,
    /// Wait for the alarm and deliver it when due
    Watch {
        /// Exit after the first delivery
        #[arg(long)]
        once: bool,
        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll_ms: u64,
    },
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        AlarmAction::Show => match db.armed()? {
            Some(alarm) => {
                let json = serde_json::json!({
                    "alarm": alarm,
                    "due_in_ms": (alarm.fire_at_ms - now_ms()).max(0),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            None => println!("no alarm armed"),
        },
        AlarmAction::Cancel => {
            db.disarm()?;
            println!("ok");
        }
        AlarmAction::FireDue => match deliver_due(&db, &config)? {
            Some(event) => emit(&event),
            None => println!("no alarm due"),
        },
        AlarmAction::Watch { once, poll_ms } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(watch(&db, &config, once, poll_ms))?;
        }
    }
    Ok(())
}

async fn watch(
    db: &Database,
    config: &Config,
    once: bool,
    poll_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(poll_ms, "watching for the completion alarm");
    let mut poll = tokio::time::interval(Duration::from_millis(poll_ms.max(1)));
    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Some(event) = deliver_due(db, config)? {
                    emit(&event);
                    if once {
                        return Ok(());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopped watching");
                return Ok(());
            }
        }
    }
}
