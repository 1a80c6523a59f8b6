//! Transient toast notifications, one per failed or completed action.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Toast severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A single toast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Holds toasts until they expire or are dismissed.
pub struct ToastCenter {
    toasts: DashMap<Uuid, Toast>,
    ttl: Duration,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(Duration::seconds(5))
    }
}

impl ToastCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: DashMap::new(),
            ttl,
        }
    }

    /// Create and store a toast.
    pub fn push(&self, severity: Severity, message: impl Into<String>) -> Toast {
        let now = Utc::now();
        let toast = Toast {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        match severity {
            Severity::Error | Severity::Warning => {
                warn!(toast_id = %toast.id, severity = ?severity, message = %toast.message, "Toast")
            }
            _ => info!(toast_id = %toast.id, severity = ?severity, message = %toast.message, "Toast"),
        }
        self.toasts.insert(toast.id, toast.clone());
        toast
    }

    pub fn push_error(&self, message: impl Into<String>) -> Toast {
        self.push(Severity::Error, message)
    }

    pub fn push_success(&self, message: impl Into<String>) -> Toast {
        self.push(Severity::Success, message)
    }

    /// Dismiss a toast before it expires.
    pub fn dismiss(&self, toast_id: Uuid) -> bool {
        self.toasts.remove(&toast_id).is_some()
    }

    /// Unexpired toasts, oldest first. Expired ones are dropped.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Toast> {
        self.toasts.retain(|_, t| t.is_active(now));
        let mut results: Vec<_> = self.toasts.iter().map(|e| e.value().clone()).collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        results
    }

    /// Every stored toast regardless of expiry, oldest first.
    pub fn history(&self) -> Vec<Toast> {
        let mut results: Vec<_> = self.toasts.iter().map(|e| e.value().clone()).collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        results
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<Toast> {
        self.history()
            .into_iter()
            .filter(|t| t.severity == severity)
            .collect()
    }
}
