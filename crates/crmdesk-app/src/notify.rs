// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Destructive,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Destructive => "destructive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_owned(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    pub fn warning(description: impl Into<String>) -> Self {
        Self {
            title: "Warning".to_owned(),
            description: description.into(),
            severity: Severity::Warning,
        }
    }
}

/// Fire-and-forget sink for user-visible failures.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Sink that only writes to the log; used where no user surface exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Info => log::info!("{}: {}", notification.title, notification.description),
            Severity::Warning => {
                log::warn!("{}: {}", notification.title, notification.description)
            }
            Severity::Destructive => {
                log::error!("{}: {}", notification.title, notification.description)
            }
        }
    }
}
