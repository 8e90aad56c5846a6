//! Process-wide auth session notifications.
//!
//! Replaces the provider's ambient `onAuthStateChange` callback with an
//! explicitly injected hub: created at startup, shared by reference, and
//! subscribed to per component. Events are delivered in publish order,
//! at-most-once per change; dropping a subscription unsubscribes it.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: String, email: String },
    SignedOut { user_id: String },
}

#[derive(Clone, Debug)]
pub struct SessionHub {
    tx: broadcast::Sender<SessionEvent>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Notify subscribers of a session change. A hub with no subscribers
    /// drops the event, matching callback semantics.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> SessionWatch {
        SessionWatch {
            rx: self.tx.subscribe(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription. Dropping it detaches from the hub.
pub struct SessionWatch {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionWatch {
    /// Next session change, or `None` once the hub is gone. A slow subscriber
    /// that lagged behind skips to the oldest retained event.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Session watch lagged, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let hub = SessionHub::new();
        let mut watch = hub.subscribe();

        hub.publish(SessionEvent::SignedIn {
            user_id: "u1".to_string(),
            email: "a@b.com".to_string(),
        });
        hub.publish(SessionEvent::SignedOut {
            user_id: "u1".to_string(),
        });

        assert_eq!(
            watch.next().await,
            Some(SessionEvent::SignedIn {
                user_id: "u1".to_string(),
                email: "a@b.com".to_string(),
            })
        );
        assert_eq!(
            watch.next().await,
            Some(SessionEvent::SignedOut {
                user_id: "u1".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn dropping_a_watch_unsubscribes() {
        let hub = SessionHub::new();
        let first = hub.subscribe();
        let second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(first);
        assert_eq!(hub.subscriber_count(), 1);
        drop(second);
        assert_eq!(hub.subscriber_count(), 0);

        // Publishing with no subscribers is a quiet no-op.
        hub.publish(SessionEvent::SignedOut {
            user_id: "u1".to_string(),
        });
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_events() {
        let hub = SessionHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.publish(SessionEvent::SignedIn {
            user_id: "u2".to_string(),
            email: "b@c.com".to_string(),
        });

        for watch in [&mut first, &mut second] {
            match watch.next().await {
                Some(SessionEvent::SignedIn { user_id, .. }) => assert_eq!(user_id, "u2"),
                other => panic!("expected SignedIn, got {other:?}"),
            }
        }
    }
}
