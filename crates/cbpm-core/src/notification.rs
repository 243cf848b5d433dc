//! # Notifications
//!
//! In-app notification records and message templates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::datetime;

stored_enum! {
    /// Severity shown by the GUI.
    #[derive(Default)]
    pub enum NotificationType as "notification_type" {
        #[default]
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub created_date: NaiveDateTime,
    pub is_read: bool,
    /// Record the notification is about (a job, a transaction, ...).
    pub related_id: Option<String>,
}

/// Builds an unread notification stamped with the current time.
pub fn create_notification(
    user_id: &str,
    title: &str,
    message: &str,
    notification_type: NotificationType,
    related_id: Option<&str>,
) -> Notification {
    Notification {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        notification_type,
        created_date: datetime::now(),
        is_read: false,
        related_id: related_id.map(String::from),
    }
}

/// Fills `{name}` placeholders from `params`.
///
/// `{{` and `}}` produce literal braces. If a placeholder has no value, or
/// the braces are unbalanced, the template comes back unchanged.
///
/// ## Example
/// ```rust
/// use cbpm_core::notification::format_notification_message;
///
/// let text = format_notification_message(
///     "{applicant} applied to {job}",
///     &[("applicant", "Paul"), ("job", "Maçon")],
/// );
/// assert_eq!(text, "Paul applied to Maçon");
///
/// assert_eq!(format_notification_message("Hi {name}", &[]), "Hi {name}");
/// ```
pub fn format_notification_message(template: &str, params: &[(&str, &str)]) -> String {
    fill_placeholders(template, params).unwrap_or_else(|| template.to_string())
}

fn fill_placeholders(template: &str, params: &[(&str, &str)]) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        '{' => return None,
                        other => name.push(other),
                    }
                }
                let (_, value) = params.iter().find(|(key, _)| *key == name)?;
                out.push_str(value);
            }
            '}' => return None,
            other => out.push(other),
        }
    }

    Some(out)
}

// =============================================================================
// Unit Tests
// =============================================================================
