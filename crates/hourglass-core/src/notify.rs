//! Completion notification.
//!
//! The notification has a fixed identity: posting it again replaces the
//! previous one instead of stacking. Without the posting permission nothing
//! is shown and nothing fails.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::Event;
use crate::storage::Database;

pub const CHANNEL_ID: &str = "hourglassChannel";
pub const NOTIFICATION_ID: i32 = 16263;
pub const COMPLETION_TITLE: &str = "My Hourglass";
pub const COMPLETION_BODY: &str = "The upper bulb of the hourglass is empty!";

/// kv key holding the permission grant.
pub const PERMISSION_KEY: &str = "notification_permission";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Default,
    High,
}

impl Importance {
    fn as_str(self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Default => "default",
            Importance::High => "high",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "low" => Importance::Low,
            "high" => Importance::High,
            _ => Importance::Default,
        }
    }
}

/// Channel the notification is posted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub importance: Importance,
    /// Dismissed when opened.
    pub auto_cancel: bool,
}

impl Notification {
    /// "The upper bulb is empty", built from constants only.
    pub fn completion() -> Self {
        Self {
            id: NOTIFICATION_ID,
            channel_id: CHANNEL_ID.to_string(),
            title: COMPLETION_TITLE.to_string(),
            body: COMPLETION_BODY.to_string(),
            importance: Importance::High,
            auto_cancel: true,
        }
    }
}

/// A notification as currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedNotification {
    #[serde(flatten)]
    pub notification: Notification,
    pub posted_at: DateTime<Utc>,
}

/// Shows notifications.
pub trait Notifier {
    /// Show `notification`, replacing any shown one with the same id.
    fn post(&self, notification: &Notification) -> Result<()>;

    /// Remove a shown notification. Returns whether one was shown.
    fn cancel(&self, id: i32) -> Result<bool>;

    fn active(&self) -> Result<Vec<PostedNotification>>;
}

/// Whether the user allowed notifications.
pub trait NotificationPermission {
    fn is_granted(&self) -> bool;
}

/// Post the completion notification if permitted.
///
/// A missing permission is expected: the result is
/// `NotificationSuppressed`, not an error.
pub fn emit_completion<N, P>(notifier: &N, permission: &P) -> Result<Event>
where
    N: Notifier + ?Sized,
    P: NotificationPermission + ?Sized,
{
    let notification = Notification::completion();
    if !permission.is_granted() {
        tracing::debug!(id = notification.id, "notification permission missing, not posting");
        return Ok(Event::NotificationSuppressed {
            id: notification.id,
            at: Utc::now(),
        });
    }
    notifier.post(&notification)?;
    Ok(Event::NotificationPosted {
        id: notification.id,
        at: Utc::now(),
    })
}

impl Notifier for Database {
    fn post(&self, notification: &Notification) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO notifications
                (id, channel_id, title, body, importance, auto_cancel, posted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                notification.id,
                notification.channel_id,
                notification.title,
                notification.body,
                notification.importance.as_str(),
                notification.auto_cancel,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::info!(id = notification.id, title = %notification.title, "notification posted");
        Ok(())
    }

    fn cancel(&self, id: i32) -> Result<bool> {
        let removed = self
            .conn()
            .execute("DELETE FROM notifications WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn active(&self) -> Result<Vec<PostedNotification>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, channel_id, title, body, importance, auto_cancel, posted_at
             FROM notifications ORDER BY posted_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let posted_at: String = row.get(6)?;
            let importance: String = row.get(4)?;
            Ok(PostedNotification {
                notification: Notification {
                    id: row.get(0)?,
                    channel_id: row.get(1)?,
                    title: row.get(2)?,
                    body: row.get(3)?,
                    importance: Importance::parse(&importance),
                    auto_cancel: row.get(5)?,
                },
                posted_at: DateTime::parse_from_rfc3339(&posted_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl NotificationPermission for Database {
    fn is_granted(&self) -> bool {
        matches!(self.kv_get(PERMISSION_KEY), Ok(Some(v)) if v == "granted")
    }
}

impl Database {
    /// Record the user's answer to the permission request.
    pub fn set_notification_permission(&self, granted: bool) -> Result<()> {
        let value = if granted { "granted" } else { "denied" };
        self.kv_set(PERMISSION_KEY, value)?;
        tracing::info!(granted, "notification permission updated");
        Ok(())
    }
}

/// Fixed answer, for hosts without a permission model.
impl NotificationPermission for bool {
    fn is_granted(&self) -> bool {
        *self
    }
}
