use std::sync::Arc;

use pastel_chat::{ChatClient, ChatConfig, ChatError, Message, Transport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::hub::BroadcastHub;

/// A peer's attachment point on a hub
pub struct HubEndpoint {
    id: String,
    hub: Arc<BroadcastHub>,
    channel: mpsc::WeakUnboundedSender<Vec<u8>>,
}

impl HubEndpoint {
    /// Subscribe to the hub, returning the endpoint and its inbound stream
    pub fn join(
        hub: Arc<BroadcastHub>,
        id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let id = id.into();
        let (channel, rx) = hub.attach(&id);
        (Self { id, hub, channel }, rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Leave the hub. A newer endpoint that joined under the same id keeps
    /// its subscription.
    pub fn leave(&self) -> bool {
        self.hub.detach(&self.id, &self.channel)
    }
}

impl Transport for HubEndpoint {
    fn send(&self, payload: Vec<u8>) -> pastel_chat::Result<()> {
        if !self.hub.is_attached(&self.id, &self.channel) {
            return Err(ChatError::Transport(format!(
                "Endpoint {} is not on channel {}",
                self.id,
                self.hub.name()
            )));
        }
        let delivered = self.hub.broadcast(&payload, Some(&self.id));
        debug!(endpoint = %self.id, delivered, "Posted payload");
        Ok(())
    }
}

impl Drop for HubEndpoint {
    fn drop(&mut self) {
        self.leave();
    }
}

/// Feed inbound payloads to the client on a dedicated task.
///
/// Each payload is handled on its own scheduling turn so a burst of inbound
/// traffic never starves the sender. Messages that decrypt are forwarded on
/// the returned channel.
pub fn spawn_inbound_pump(
    client: Arc<ChatClient>,
    mut inbound: mpsc::UnboundedReceiver<Vec<u8>>,
) -> (JoinHandle<()>, mpsc::UnboundedReceiver<Message>) {
    let (notify_tx, notify_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        while let Some(payload) = inbound.recv().await {
            if let Some(message) = client.handle_inbound(&payload) {
                debug!(id = %message.id, "Inbound message accepted");
                // Nobody listening is fine, history already has it
                let _ = notify_tx.send(message);
            }
            tokio::task::yield_now().await;
        }
        info!("Inbound stream ended");
    });

    (handle, notify_rx)
}

/// A chat client joined to a hub with its inbound pump running
pub struct Peer {
    pub name: String,
    pub client: Arc<ChatClient>,
    pub endpoint: Arc<HubEndpoint>,
    pub inbox: mpsc::UnboundedReceiver<Message>,
    pump: JoinHandle<()>,
}

impl Peer {
    pub fn join(hub: &Arc<BroadcastHub>, name: &str, config: ChatConfig) -> Self {
        let (endpoint, inbound) = HubEndpoint::join(Arc::clone(hub), name);
        let endpoint = Arc::new(endpoint);
        let client = Arc::new(ChatClient::new(endpoint.clone(), config));
        let (pump, inbox) = spawn_inbound_pump(Arc::clone(&client), inbound);

        Self {
            name: name.to_string(),
            client,
            endpoint,
            inbox,
            pump,
        }
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
