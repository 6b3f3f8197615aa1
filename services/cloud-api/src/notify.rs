//! Push notifications for new snapshots
//!
//! Fire-and-forget: a notification that nobody receives, or that a lagging
//! subscriber misses, is not an error. Clients that care poll the read
//! endpoints.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::trace;
use types::SnapshotUpdate;

pub trait SnapshotNotifier: Send + Sync {
    fn notify(&self, source_id: &str, timestamp_utc: DateTime<Utc>);
}

/// Broadcasts every update to all connected subscribers
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<SnapshotUpdate>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotUpdate> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl SnapshotNotifier for BroadcastNotifier {
    fn notify(&self, source_id: &str, timestamp_utc: DateTime<Utc>) {
        let update = SnapshotUpdate {
            source_id: source_id.to_string(),
            timestamp_utc,
        };
        // Err only means there are no subscribers right now
        if self.sender.send(update).is_err() {
            trace!(source_id, "No subscribers for snapshot update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn test_subscriber_receives_update() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();
        let now = Utc::now();
        notifier.notify("acct-1", now);

        let update = rx.recv().await.unwrap();
        assert_eq!(update.source_id, "acct-1");
        assert_eq!(update.timestamp_utc, now);
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let notifier = BroadcastNotifier::new(8);
        assert_eq!(notifier.subscriber_count(), 0);
        notifier.notify("acct-1", Utc::now());
    }

    #[tokio::test]
    async fn test_lagging_subscriber_drops_oldest() {
        let notifier = BroadcastNotifier::new(2);
        let mut rx = notifier.subscribe();
        for i in 0..5 {
            notifier.notify(&format!("acct-{}", i), Utc::now());
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap().source_id, "acct-3");
    }
}
