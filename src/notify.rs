use std::io::Write;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Default,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn request_permission(&self) -> Permission;

    fn permission(&self) -> Permission;

    fn show(&self, notification: &Notification) -> AppResult<()>;
}

/// Logs the reminder and writes it to stderr.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, notification: &Notification) -> AppResult<()> {
        tracing::info!(title = %notification.title, "showing notification");
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "🔔 {}\n   {}", notification.title, notification.body)
            .map_err(|err| AppError::Notification(err.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn request_permission(&self) -> Permission {
        Permission::Unavailable
    }

    fn permission(&self) -> Permission {
        Permission::Unavailable
    }

    fn show(&self, _notification: &Notification) -> AppResult<()> {
        Err(AppError::Notification("notifications are disabled".to_string()))
    }
}
