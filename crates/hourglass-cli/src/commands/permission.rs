use clap::Subcommand;
use hourglass_core::{Database, NotificationPermission};

#[derive(Subcommand)]
pub enum PermissionAction {
    /// Allow the completion notification
    Grant,
    /// Deny the completion notification
    Revoke,
    /// Print whether notifications are allowed
    Status,
}

pub fn run(action: PermissionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        PermissionAction::Grant => {
            db.set_notification_permission(true)?;
            println!("granted");
        }
        PermissionAction::Revoke => {
            db.set_notification_permission(false)?;
            println!("denied");
        }
        PermissionAction::Status => {
            println!("{}", if db.is_granted() { "granted" } else { "denied" });
        }
    }
    Ok(())
}
