use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Same-process broadcast channel.
///
/// Every payload is fanned out to all subscribers except its sender. There is
/// no history and no replay: endpoints only see what is posted while they are
/// subscribed.
pub struct BroadcastHub {
    name: String,
    /// endpoint id -> inbound channel
    subscribers: DashMap<String, mpsc::UnboundedSender<Vec<u8>>>,
}

impl BroadcastHub {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an endpoint. Re-subscribing an id replaces its previous channel.
    pub fn subscribe(&self, endpoint_id: &str) -> mpsc::UnboundedReceiver<Vec<u8>> {
        self.attach(endpoint_id).1
    }

    /// Like [`subscribe`](Self::subscribe), also returning a handle to the
    /// new channel for [`detach`](Self::detach) and [`is_attached`](Self::is_attached).
    pub fn attach(
        &self,
        endpoint_id: &str,
    ) -> (
        mpsc::WeakUnboundedSender<Vec<u8>>,
        mpsc::UnboundedReceiver<Vec<u8>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tx.downgrade();
        if self.subscribers.insert(endpoint_id.to_string(), tx).is_some() {
            info!(channel = %self.name, endpoint = endpoint_id, "Replaced existing subscription");
        } else {
            info!(channel = %self.name, endpoint = endpoint_id, "Endpoint joined");
        }
        (handle, rx)
    }

    pub fn unsubscribe(&self, endpoint_id: &str) -> bool {
        let removed = self.subscribers.remove(endpoint_id).is_some();
        if removed {
            info!(channel = %self.name, endpoint = endpoint_id, "Endpoint left");
        }
        removed
    }

    /// Remove `endpoint_id` only while it still maps to `channel`.
    /// A subscription that replaced it under the same id is left alone.
    pub fn detach(&self, endpoint_id: &str, channel: &mpsc::WeakUnboundedSender<Vec<u8>>) -> bool {
        let Some(channel) = channel.upgrade() else {
            return false;
        };
        let removed = self
            .subscribers
            .remove_if(endpoint_id, |_, tx| tx.same_channel(&channel))
            .is_some();
        if removed {
            info!(channel = %self.name, endpoint = endpoint_id, "Endpoint left");
        }
        removed
    }

    pub fn is_attached(&self, endpoint_id: &str, channel: &mpsc::WeakUnboundedSender<Vec<u8>>) -> bool {
        let Some(channel) = channel.upgrade() else {
            return false;
        };
        self.subscribers
            .get(endpoint_id)
            .is_some_and(|tx| tx.same_channel(&channel))
    }

    pub fn is_subscribed(&self, endpoint_id: &str) -> bool {
        self.subscribers.contains_key(endpoint_id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Send payload to every subscriber except `exclude`.
    /// Returns how many endpoints it was delivered to.
    pub fn broadcast(&self, payload: &[u8], exclude: Option<&str>) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.subscribers.iter() {
            if Some(entry.key().as_str()) == exclude {
                continue;
            }
            if entry.value().send(payload.to_vec()).is_ok() {
                delivered += 1;
            } else {
                closed.push(entry.key().clone());
            }
        }

        // Receivers dropped without unsubscribing
        for endpoint_id in closed {
            self.subscribers
                .remove_if(&endpoint_id, |_, tx| tx.is_closed());
            debug!(channel = %self.name, endpoint = %endpoint_id, "Pruned closed subscriber");
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hub_is_empty() {
        let hub = BroadcastHub::new("room");
        assert_eq!(hub.name(), "room");
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.broadcast(b"nobody", None), 0);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let hub = BroadcastHub::new("room");
        let _rx = hub.subscribe("alice");
        assert!(hub.is_subscribed("alice"));
        assert_eq!(hub.subscriber_count(), 1);

        assert!(hub.unsubscribe("alice"));
        assert!(!hub.is_subscribed("alice"));
        assert!(!hub.unsubscribe("alice"));
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let hub = BroadcastHub::new("room");
        let mut alice = hub.subscribe("alice");
        let mut bob = hub.subscribe("bob");
        let mut carol = hub.subscribe("carol");

        assert_eq!(hub.broadcast(b"packet", Some("alice")), 2);

        assert!(alice.try_recv().is_err());
        assert_eq!(bob.try_recv().unwrap(), b"packet".to_vec());
        assert_eq!(carol.try_recv().unwrap(), b"packet".to_vec());
    }

    #[test]
    fn test_broadcast_to_all() {
        let hub = BroadcastHub::new("room");
        let mut alice = hub.subscribe("alice");
        let mut bob = hub.subscribe("bob");

        assert_eq!(hub.broadcast(b"everyone", None), 2);
        assert_eq!(alice.try_recv().unwrap(), b"everyone".to_vec());
        assert_eq!(bob.try_recv().unwrap(), b"everyone".to_vec());
    }

    #[test]
    fn test_payload_order_per_subscriber() {
        let hub = BroadcastHub::new("room");
        let mut bob = hub.subscribe("bob");

        hub.broadcast(b"one", None);
        hub.broadcast(b"two", None);

        assert_eq!(bob.try_recv().unwrap(), b"one".to_vec());
        assert_eq!(bob.try_recv().unwrap(), b"two".to_vec());
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let hub = BroadcastHub::new("room");
        let rx = hub.subscribe("ghost");
        let mut bob = hub.subscribe("bob");
        drop(rx);

        assert_eq!(hub.broadcast(b"hello", None), 1);
        assert!(!hub.is_subscribed("ghost"));
        assert!(hub.is_subscribed("bob"));
        assert_eq!(bob.try_recv().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_resubscribe_replaces_channel() {
        let hub = BroadcastHub::new("room");
        let mut old = hub.subscribe("alice");
        let mut new = hub.subscribe("alice");
        assert_eq!(hub.subscriber_count(), 1);

        hub.broadcast(b"x", None);
        assert!(old.try_recv().is_err());
        assert_eq!(new.try_recv().unwrap(), b"x".to_vec());
    }

    #[test]
    fn test_detach_leaves_replacement_in_place() {
        let hub = BroadcastHub::new("room");
        let (stale, _old_rx) = hub.attach("alice");
        let (live, mut live_rx) = hub.attach("alice");

        assert!(!hub.is_attached("alice", &stale));
        assert!(hub.is_attached("alice", &live));
        assert!(!hub.detach("alice", &stale));
        assert!(hub.is_subscribed("alice"));

        hub.broadcast(b"still here", None);
        assert_eq!(live_rx.try_recv().unwrap(), b"still here".to_vec());

        assert!(hub.detach("alice", &live));
        assert!(!hub.is_subscribed("alice"));
    }
}
