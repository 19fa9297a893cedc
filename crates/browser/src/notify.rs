//! Notification scheduler: the sole user-facing error/success channel.
//!
//! [`NotificationCenter`] is explicit process-scoped state constructed at
//! startup: no singleton container, no first-access creation race. Toasts
//! fan out to subscribers over a broadcast channel; each toast gets its own
//! independent expiry timer, so dismissing or expiring one never affects
//! the others, and no shared queue capacity is enforced on the active set.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use promptdex_core::error::CoreError;
use promptdex_core::types::Timestamp;

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

/// How loudly the toast renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// How long a toast of this severity stays up by default.
    fn default_duration(self) -> Duration {
        match self {
            Self::Error => Duration::from_secs(6),
            _ => Duration::from_secs(4),
        }
    }
}

/// One ephemeral notification. Not persisted anywhere.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub created_at: Timestamp,
    pub duration: Duration,
}

/// Lifecycle events fanned out to renderers.
#[derive(Debug, Clone)]
pub enum ToastEvent {
    Shown(Toast),
    Dismissed(Uuid),
}

// ---------------------------------------------------------------------------
// Center
// ---------------------------------------------------------------------------

/// Broadcast buffer; slow renderers observe a lag error, never block.
const CHANNEL_CAPACITY: usize = 64;

/// Owns the active toasts and their expiry timers.
#[derive(Clone)]
pub struct NotificationCenter {
    sender: broadcast::Sender<ToastEvent>,
    active: Arc<Mutex<Vec<Toast>>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            active: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to toast lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.sender.subscribe()
    }

    /// Currently visible toasts, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.active.lock().expect("toast lock").clone()
    }

    /// Show a toast with the severity's default duration. Returns its id.
    pub fn push(&self, severity: Severity, message: impl Into<String>) -> Uuid {
        self.push_with_duration(severity, message, severity.default_duration())
    }

    /// Show a toast with an explicit duration and schedule its expiry.
    pub fn push_with_duration(
        &self,
        severity: Severity,
        message: impl Into<String>,
        duration: Duration,
    ) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
            duration,
        };
        let id = toast.id;

        self.active.lock().expect("toast lock").push(toast.clone());
        let _ = self.sender.send(ToastEvent::Shown(toast));

        // One independent timer per toast.
        let center = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            center.dismiss(id);
        });
        id
    }

    /// Remove a toast now. A no-op when it already expired, so the timer
    /// racing a manual dismissal never announces a second removal.
    pub fn dismiss(&self, id: Uuid) {
        let removed = {
            let mut active = self.active.lock().expect("toast lock");
            let before = active.len();
            active.retain(|toast| toast.id != id);
            before != active.len()
        };
        if removed {
            let _ = self.sender.send(ToastEvent::Dismissed(id));
        }
    }

    // -- convenience levels ---------------------------------------------------

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.push(Severity::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(Severity::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.push(Severity::Warning, message)
    }

    /// Surface a failed operation. Every user-visible failure goes through
    /// here; nothing is swallowed silently.
    pub fn report(&self, context: &str, err: &CoreError) -> Uuid {
        tracing::warn!(error = %err, "{context}");
        self.push(Severity::Error, format!("{context}: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
