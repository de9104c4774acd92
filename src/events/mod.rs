//! In-process change feed.
//!
//! Mutation handlers publish `ChangeEvent`s addressed to profile ids, and
//! `/api/events` serves each authenticated user their filtered slice as
//! Server-Sent Events. The HTTP connection is the subscription scope:
//! dropping it releases the receiver.

use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NotificationCreated,
    InvitationUpdated,
    DraftUpdated,
    DraftFinalized,
    EntryShared,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::NotificationCreated => "notification_created",
            ChangeKind::InvitationUpdated => "invitation_updated",
            ChangeKind::DraftUpdated => "draft_updated",
            ChangeKind::DraftFinalized => "draft_finalized",
            ChangeKind::EntryShared => "entry_shared",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Profiles this event is addressed to.
    pub recipients: Vec<i32>,
    pub payload: serde_json::Value,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, recipients: Vec<i32>, payload: serde_json::Value) -> Self {
        Self {
            kind,
            recipients,
            payload,
        }
    }

    pub fn is_for(&self, profile_id: i32) -> bool {
        self.recipients.contains(&profile_id)
    }
}

/// Broadcast fan-out shared through `AppState`.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { tx }
    }

    /// Publish is best-effort: with no subscribers the event is dropped,
    /// which is fine since the database already holds the state.
    pub fn publish(&self, event: ChangeEvent) {
        let kind = event.kind;
        let recipients = event.recipients.len();
        if self.tx.send(event).is_err() {
            tracing::trace!(kind = kind.as_str(), "Change event dropped, no subscribers");
        } else {
            tracing::debug!(kind = kind.as_str(), recipients, "Change event published");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(ChangeEvent::new(
            ChangeKind::DraftUpdated,
            vec![1, 2],
            json!({"draft_id": "abc-1"}),
        ));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::DraftUpdated);
        assert!(event.is_for(1));
        assert!(event.is_for(2));
        assert!(!event.is_for(3));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        // Must not panic or block.
        bus.publish(ChangeEvent::new(
            ChangeKind::NotificationCreated,
            vec![1],
            json!({}),
        ));
    }

    #[tokio::test]
    async fn test_each_subscriber_gets_own_copy() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(ChangeEvent::new(ChangeKind::EntryShared, vec![7], json!({})));

        assert_eq!(a.recv().await.unwrap().kind, ChangeKind::EntryShared);
        assert_eq!(b.recv().await.unwrap().kind, ChangeKind::EntryShared);
    }
}
