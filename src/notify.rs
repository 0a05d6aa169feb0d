//! Transient user notifications ("toasts").
//!
//! The store and fetcher report outcomes through a [`Notifier`] in addition
//! to returning them, so a presentation layer can show a short message
//! without threading errors through its own code.

use std::sync::{Arc, Mutex};

use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs notifications through `tracing`; the default for library use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success => tracing::info!(target: "drivechat::toast", "{}", n.message),
            NotificationLevel::Error => tracing::warn!(target: "drivechat::toast", "{}", n.message),
        }
    }
}

/// Prints coloured one-liners to stderr, keeping stdout for the transcript.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success => eprintln!("{} {}", "✓".bright_green(), n.message.green()),
            NotificationLevel::Error => eprintln!("{} {}", "✗".bright_red(), n.message.red()),
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let rec = RecordingNotifier::new();
        rec.notify(Notification::success("a"));
        rec.notify(Notification::error("b"));
        rec.notify(Notification::error("c"));
        let all = rec.notifications();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], Notification::success("a"));
        assert_eq!(rec.errors(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_recording_notifier_clones_share_storage() {
        let rec = RecordingNotifier::new();
        let handle = rec.clone();
        handle.notify(Notification::error("shared"));
        assert_eq!(rec.errors(), vec!["shared".to_string()]);
    }

    #[test]
    fn test_notifiers_are_object_safe() {
        let boxed: Vec<Box<dyn Notifier>> = vec![
            Box::new(TracingNotifier) as Box<dyn Notifier>,
            Box::new(ConsoleNotifier),
            Box::new(RecordingNotifier::new()),
        ];
        for n in &boxed {
            n.notify(Notification::success("ok"));
        }
    }
}
