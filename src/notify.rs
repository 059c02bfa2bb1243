//! Notification delivery
//!
//! The engine writes outbox rows inside the transition transaction and hands
//! them to a [`NotificationSink`] only after commit. Delivery is best-effort:
//! a failing sink is logged and never undoes the transition.

use std::sync::Mutex;

use anyhow::Result;
use tracing::{info, warn};

use crate::models::Notification;

pub trait NotificationSink {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Deliver every notification, logging failures instead of propagating them.
/// Returns how many were delivered.
pub fn dispatch<N: NotificationSink + ?Sized>(sink: &N, notifications: &[Notification]) -> usize {
    let mut delivered = 0;
    for notification in notifications {
        match sink.notify(notification) {
            Ok(()) => delivered += 1,
            Err(e) => warn!(
                user_id = notification.user_id,
                case_id = notification.case_id,
                error = %format!("{e:#}"),
                "notification delivery failed"
            ),
        }
    }
    delivered
}

/// Sink that emits each notification as a log event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            user_id = notification.user_id,
            case_id = notification.case_id,
            severity = %notification.severity,
            title = %notification.title,
            "{}",
            notification.message
        );
        Ok(())
    }
}

/// Discards everything; used when notifications are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// Keeps delivered notifications in memory, optionally failing every call
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        if self.fail {
            anyhow::bail!("notification sink unavailable");
        }
        self.delivered
            .lock()
            .map_err(|_| anyhow::anyhow!("recording notifier lock poisoned"))?
            .push(notification.clone());
        Ok(())
    }
}
