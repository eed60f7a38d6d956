//! Notification values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalizer::ErrorDetail;

/// Letters a user reads per second
const LETTERS_PER_SECOND: u64 = 7;

/// Lower bound for the computed display duration
pub const MIN_READING_TIME_MS: i64 = 7000;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Warning => write!(f, "warning"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// A notification as queued and shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Message text
    pub message: String,
    /// Severity
    pub kind: NotificationKind,
    /// When the notification was queued
    pub time: DateTime<Utc>,
    /// Display duration in milliseconds; `<= 0` means it stays until dismissed
    pub timeout_ms: i64,
    /// Details of the failed request behind an error notification
    pub error: Option<ErrorDetail>,
}

impl Notification {
    /// Whether this notification expires on its own
    pub fn auto_dismisses(&self) -> bool {
        self.timeout_ms > 0
    }

    /// Path of the request that caused this notification
    pub fn error_path(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.path.as_deref())
    }

    /// Whether `other` occupies the same deduplication slot
    pub fn same_slot(&self, other: &Notification) -> bool {
        self.message == other.message && self.kind == other.kind && self.error_path() == other.error_path()
    }

    /// Identity used for removal
    pub fn same_identity(&self, other: &Notification) -> bool {
        self.time == other.time && self.message == other.message
    }
}

/// A notification request before it is stamped by the queue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNotification {
    pub message: String,
    pub kind: Option<NotificationKind>,
    pub timeout_ms: Option<i64>,
    pub error: Option<ErrorDetail>,
}

impl NewNotification {
    /// A notification with default kind and duration
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message).kind(NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message).kind(NotificationKind::Error)
    }

    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Explicit display duration; `0` keeps the notification until dismissed
    pub fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_error(mut self, error: Option<ErrorDetail>) -> Self {
        self.error = error;
        self
    }

    /// Stamp with the given time and resolve defaults
    pub fn stamp(self, time: DateTime<Utc>) -> Notification {
        let timeout_ms = self
            .timeout_ms
            .unwrap_or_else(|| reading_time_ms(&self.message));
        Notification {
            kind: self.kind.unwrap_or_default(),
            timeout_ms,
            message: self.message,
            time,
            error: self.error,
        }
    }
}

/// Time needed to read `text`, never less than seven seconds
pub fn reading_time_ms(text: &str) -> i64 {
    let letters = text.chars().filter(|c| *c != ' ').count() as u64;
    let ms = (letters * 1000).div_ceil(LETTERS_PER_SECOND);
    (ms as i64).max(MIN_READING_TIME_MS)
}
