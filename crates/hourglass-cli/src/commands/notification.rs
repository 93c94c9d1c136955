use clap::Subcommand;
use hourglass_core::notify::NOTIFICATION_ID;
use hourglass_core::{Database, Notifier};

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List shown notifications as JSON
    List,
    /// Open a notification; auto-cancel notifications are dismissed
    Open {
        #[arg(default_value_t = NOTIFICATION_ID)]
        id: i32,
    },
    /// Dismiss a notification
    Dismiss {
        #[arg(default_value_t = NOTIFICATION_ID)]
        id: i32,
    },
}

pub fn run(action: NotificationAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        NotificationAction::List => {
            let shown = db.active()?;
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        NotificationAction::Open { id } => {
            let Some(shown) = db.active()?.into_iter().find(|n| n.notification.id == id) else {
                eprintln!("no notification {id}");
                std::process::exit(1);
            };
            println!("{}: {}", shown.notification.title, shown.notification.body);
            if shown.notification.auto_cancel {
                db.cancel(id)?;
            }
        }
        NotificationAction::Dismiss { id } => {
            if db.cancel(id)? {
                println!("ok");
            } else {
                println!("no notification {id}");
            }
        }
    }
    Ok(())
}
