//! Publish/subscribe channel for resource change events.
//!
//! # Responsibility
//! - Broadcast one `ChangeEvent` per effective write.
//! - Hand each subscriber a filtered stream of events related to the URI it
//!   subscribed to.
//!
//! # Invariants
//! - Publishing never fails, even with zero subscribers.
//! - A lagging subscriber skips missed events instead of erroring.

use crate::provider::uri::ContentUri;
use log::{debug, warn};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Signal that data behind `uri` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub uri: ContentUri,
}

/// Change event publisher owned by the provider.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Broadcasts a change for `uri`.
    pub fn publish(&self, uri: &ContentUri) {
        let receivers = self
            .sender
            .send(ChangeEvent { uri: uri.clone() })
            .unwrap_or(0);
        debug!(
            "event=change_publish module=provider status=ok uri={} receivers={}",
            uri, receivers
        );
    }

    /// Subscribes to changes related to `uri`.
    pub fn subscribe(&self, uri: ContentUri) -> ChangeSubscription {
        ChangeSubscription {
            uri,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Stream of change events related to one URI.
#[derive(Debug)]
pub struct ChangeSubscription {
    uri: ContentUri,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    pub fn uri(&self) -> &ContentUri {
        &self.uri
    }

    /// Waits for the next related event.
    ///
    /// Returns `None` once every notifier handle has been dropped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.uri.is_related(&event.uri) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "event=change_lagged module=provider status=error uri={} skipped={}",
                        self.uri, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next related event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.uri.is_related(&event.uri) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(
                        "event=change_lagged module=provider status=error uri={} skipped={}",
                        self.uri, skipped
                    );
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChangeNotifier;
    use crate::provider::uri::ContentUri;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let notifier = ChangeNotifier::new();
        notifier.publish(&ContentUri::books("a"));
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn subscription_filters_unrelated_uris() {
        let notifier = ChangeNotifier::new();
        let books = ContentUri::books("a");
        let mut one = notifier.subscribe(books.with_appended_id(1));

        notifier.publish(&books.with_appended_id(2));
        notifier.publish(&ContentUri::books("b"));
        assert_eq!(one.try_recv(), None);

        notifier.publish(&books);
        let event = one.try_recv().expect("collection change reaches item observers");
        assert_eq!(event.uri, books);
    }

    #[tokio::test]
    async fn recv_returns_none_after_notifier_drop() {
        let notifier = ChangeNotifier::new();
        let books = ContentUri::books("a");
        let mut subscription = notifier.subscribe(books.clone());
        notifier.publish(&books.with_appended_id(9));
        drop(notifier);

        let first = subscription.recv().await.expect("queued event survives drop");
        assert_eq!(first.uri, books.with_appended_id(9));
        assert_eq!(subscription.recv().await, None);
    }
}
