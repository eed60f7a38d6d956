//! Transient user notifications
//!
//! Success and error messages produced by API calls are collected in a
//! [`NotificationQueue`] that UI layers subscribe to.

pub mod notification;
pub mod queue;

pub use notification::{reading_time_ms, NewNotification, Notification, NotificationKind, MIN_READING_TIME_MS};
pub use queue::NotificationQueue;
