//! Ordered queue of visible notifications
//!
//! The queue lives inside a `tokio::sync::watch` channel: every change
//! publishes a new snapshot to subscribers, most recent notification first.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::notification::{NewNotification, Notification, NotificationKind};

/// Shared notification queue
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    inner: Arc<watch::Sender<Vec<Notification>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { inner: Arc::new(tx) }
    }

    /// Stamp and queue a notification
    ///
    /// A non-success notification replaces a queued one with the same
    /// message, kind and error path. Success notifications always stack.
    /// When the duration is positive a removal is scheduled on the tokio
    /// runtime.
    pub fn add(&self, notification: NewNotification) -> Notification {
        let notification = notification.stamp(Utc::now());

        self.inner.send_modify(|queue| {
            if notification.kind != NotificationKind::Success {
                if let Some(index) = queue.iter().position(|item| item.same_slot(&notification)) {
                    queue.remove(index);
                }
            }
            queue.insert(0, notification.clone());
        });

        if notification.kind == NotificationKind::Error {
            error!(notification = %notification.message, "Error notification queued");
            if let Some(correlation_id) = notification.error.as_ref().and_then(|e| e.correlation_id.as_deref()) {
                info!(correlation_id = %correlation_id, "Correlation ID");
            }
        }

        if notification.auto_dismisses() {
            self.schedule_removal(&notification);
        }

        notification
    }

    /// Remove the queued notification with the same time and message
    pub fn remove(&self, notification: &Notification) -> bool {
        self.inner.send_if_modified(|queue| {
            let before = queue.len();
            queue.retain(|item| !item.same_identity(notification));
            queue.len() != before
        })
    }

    /// Remove everything
    pub fn clear(&self) {
        self.inner.send_if_modified(|queue| {
            let changed = !queue.is_empty();
            queue.clear();
            changed
        });
    }

    /// Remove error notifications, keeping all others
    pub fn clear_errors(&self) {
        self.inner.send_if_modified(|queue| {
            let before = queue.len();
            queue.retain(|item| item.kind != NotificationKind::Error);
            queue.len() != before
        });
    }

    /// Current queue contents, most recent first
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Receive a fresh snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.subscribe()
    }

    fn schedule_removal(&self, notification: &Notification) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                notification = %notification.message,
                "No async runtime available, notification will not expire"
            );
            return;
        };

        let queue: Weak<watch::Sender<Vec<Notification>>> = Arc::downgrade(&self.inner);
        let target = notification.clone();
        let delay = Duration::from_millis(notification.timeout_ms as u64);

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = queue.upgrade() {
                NotificationQueue { inner }.remove(&target);
            }
        });
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::ErrorDetail;
    use proptest::prelude::*;

    fn with_path(path: &str) -> Option<ErrorDetail> {
        Some(ErrorDetail {
            path: Some(path.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_removal_after_duration() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::success("Saved").timeout_ms(3000));
        assert_eq!(queue.len(), 1);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(queue.len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_duration_is_reading_time() {
        let queue = NotificationQueue::new();
        let n = queue.add(NewNotification::new("Done"));
        assert_eq!(n.timeout_ms, 7000);

        tokio::time::sleep(Duration::from_millis(7001)).await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_positive_duration_never_expires() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::error("Stays").timeout_ms(0));
        queue.add(NewNotification::error("Also stays").timeout_ms(-5));

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_errors_replace_each_other() {
        let queue = NotificationQueue::new();
        let first = queue.add(NewNotification::error("Name is required").timeout_ms(0).with_error(with_path("concepts/odms/forms")));
        let second = queue.add(NewNotification::error("Name is required").timeout_ms(0).with_error(with_path("concepts/odms/forms")));

        let items = queue.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].time, second.time);
        assert!(second.time >= first.time);
    }

    #[tokio::test]
    async fn test_different_paths_do_not_collide() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::error("Not found").timeout_ms(0).with_error(with_path("concepts/odms/forms")));
        queue.add(NewNotification::error("Not found").timeout_ms(0).with_error(with_path("concepts/odms/items")));
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_success_notifications_stack() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::success("Saved").timeout_ms(0));
        queue.add(NewNotification::success("Saved").timeout_ms(0));
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_most_recent_first() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::success("first").timeout_ms(0));
        queue.add(NewNotification::success("second").timeout_ms(0));
        let messages: Vec<String> = queue.snapshot().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_remove_requires_time_and_message() {
        let queue = NotificationQueue::new();
        let kept = queue.add(NewNotification::success("Saved").timeout_ms(0));

        let mut impostor = kept.clone();
        impostor.time = kept.time + chrono::Duration::milliseconds(1);
        assert!(!queue.remove(&impostor));

        let mut renamed = kept.clone();
        renamed.message = "Other".to_string();
        assert!(!queue.remove(&renamed));

        assert!(queue.remove(&kept));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_clear_errors() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::error("e1").timeout_ms(0));
        queue.add(NewNotification::success("s1").timeout_ms(0));
        queue.add(NewNotification::new("w1").kind(NotificationKind::Warning).timeout_ms(0));

        queue.clear_errors();
        let kinds: Vec<NotificationKind> = queue.snapshot().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Warning, NotificationKind::Success]);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let queue = NotificationQueue::new();
        let mut rx = queue.subscribe();

        queue.add(NewNotification::error("boom").timeout_ms(0));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        queue.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_add_without_runtime_keeps_notification() {
        let queue = NotificationQueue::new();
        queue.add(NewNotification::success("no runtime"));
        assert_eq!(queue.len(), 1);
    }

    fn kind_strategy() -> impl Strategy<Value = NotificationKind> {
        prop_oneof![
            Just(NotificationKind::Success),
            Just(NotificationKind::Info),
            Just(NotificationKind::Warning),
            Just(NotificationKind::Error),
        ]
    }

    proptest! {
        #[test]
        fn prop_clear_errors_partitions_queue(entries in proptest::collection::vec((kind_strategy(), "[a-c]{1,2}"), 0..30)) {
            let queue = NotificationQueue::new();
            for (kind, message) in &entries {
                queue.add(NewNotification::new(message.clone()).kind(*kind).timeout_ms(0));
            }
            let before: Vec<Notification> = queue.snapshot();
            queue.clear_errors();
            let after = queue.snapshot();

            let expected: Vec<Notification> = before
                .into_iter()
                .filter(|n| n.kind != NotificationKind::Error)
                .collect();
            prop_assert_eq!(after, expected);
        }

        #[test]
        fn prop_at_most_one_non_success_per_slot(entries in proptest::collection::vec((kind_strategy(), "[a-c]"), 0..30)) {
            let queue = NotificationQueue::new();
            for (kind, message) in &entries {
                queue.add(NewNotification::new(message.clone()).kind(*kind).timeout_ms(0));
            }
            let items = queue.snapshot();
            for (i, a) in items.iter().enumerate() {
                for b in items.iter().skip(i + 1) {
                    if a.kind != NotificationKind::Success {
                        prop_assert!(!a.same_slot(b));
                    }
                }
            }
        }
    }
}
