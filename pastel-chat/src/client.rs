//! Host-side chat client.
//!
//! Wires a `SessionController` to an injected transport and keeps the chat
//! history the UI renders. Inbound payloads are untrusted: anything that does
//! not parse or authenticate is logged and dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::models::input::{MessageLimits, OutgoingMessage};
use crate::models::{ChatHistory, EncryptedPacket, Message, Sender};
use crate::session::{SessionController, SessionState};

/// Outbound half of the channel carrying chat payloads between peers.
///
/// Delivery may be lossy, reordered or duplicated. Inbound payloads are fed
/// to [`ChatClient::handle_inbound`] by whoever owns the receiving side.
pub trait Transport: Send + Sync {
   fn send(&self, payload: Vec<u8>) -> Result<()>;
}

pub struct ChatClient {
   session: Mutex<SessionController>,
   history: Mutex<ChatHistory>,
   transport: Arc<dyn Transport>,
   config: ChatConfig,
}

impl ChatClient {
   pub fn new(transport: Arc<dyn Transport>, config: ChatConfig) -> Self {
      Self {
         session: Mutex::new(SessionController::new()),
         history: Mutex::new(ChatHistory::new()),
         transport,
         config,
      }
   }

   // Transitions are atomic, so state behind a poisoned lock is still consistent
   fn session(&self) -> MutexGuard<'_, SessionController> {
      self.session.lock().unwrap_or_else(PoisonError::into_inner)
   }

   fn history(&self) -> MutexGuard<'_, ChatHistory> {
      self.history.lock().unwrap_or_else(PoisonError::into_inner)
   }

   pub fn config(&self) -> &ChatConfig {
      &self.config
   }

   pub fn state(&self) -> SessionState {
      self.session().state()
   }

   pub fn public_key(&self) -> Option<String> {
      self.session().public_key().map(str::to_string)
   }

   /// Generate session keys and return the public key to share with the peer
   pub fn start(&self) -> Result<String> {
      self.session().start()
   }

   pub fn connect(&self, peer_public_key: &str) -> Result<()> {
      self.session().connect(peer_public_key)
   }

   /// Connect without blocking the async runtime.
   ///
   /// The session reads `Connecting` for the whole call: through the
   /// configured connect delay and while import and derivation run on the
   /// blocking pool. Dropping the future before it completes returns the
   /// session to `KeysReady`.
   pub async fn connect_async(self: &Arc<Self>, peer_public_key: &str) -> Result<()> {
      self.session().begin_connect()?;
      let mut pending = PendingConnect {
         client: self,
         armed: true,
      };

      if !self.config.connect_delay.is_zero() {
         tokio::time::sleep(self.config.connect_delay).await;
      }

      let client = Arc::clone(self);
      let peer_public_key = peer_public_key.to_string();
      let outcome = tokio::task::spawn_blocking(move || {
         let mut session = client.session();
         session.complete_connect(&peer_public_key)
      })
      .await
      .map_err(connect_task_failed)?;

      // Completion already left Connecting
      pending.armed = false;
      outcome
   }

   /// Encrypt, transmit and record an outgoing message.
   ///
   /// History is only updated once the transport accepted the packet.
   pub fn send_message(&self, content: &str) -> Result<Message> {
      OutgoingMessage {
         content: content.to_string(),
      }
      .validate_input(&MessageLimits {
         max_len: self.config.max_message_len,
      })?;

      let packet = self.session().send(content)?;
      let payload = serde_json::to_vec(&packet)?;
      self.transport.send(payload)?;

      let message = Message::new(content.to_string(), Sender::Local);
      self.history().push(message.clone());
      Ok(message)
   }

   /// Process one inbound payload, returning the message it carried if any
   pub fn handle_inbound(&self, payload: &[u8]) -> Option<Message> {
      let packet: EncryptedPacket = match serde_json::from_slice(payload) {
         Ok(p) => p,
         Err(e) => {
            warn!("Ignoring unparseable inbound payload: {}", e);
            return None;
         }
      };

      let received = self.session().receive(&packet);
      let plaintext = match received {
         Ok(Some(text)) => text,
         Ok(None) => return None,
         Err(ChatError::NotConnected) => {
            debug!("Dropping inbound packet, session not connected");
            return None;
         }
         Err(e) => {
            warn!("Inbound packet failed: {}", e);
            return None;
         }
      };

      let message = Message::new(plaintext, Sender::Peer);
      self.history().push(message.clone());
      Some(message)
   }

   pub fn messages(&self) -> Vec<Message> {
      self.history().to_vec()
   }

   pub fn clear_history(&self) {
      let mut history = self.history();
      info!(count = history.len(), "Clearing chat history");
      history.clear();
   }
}

/// Cancels a pending connect unless disarmed
struct PendingConnect<'a> {
   client: &'a ChatClient,
   armed: bool,
}

impl Drop for PendingConnect<'_> {
   fn drop(&mut self) {
      if self.armed {
         self.client.session().cancel_connect();
      }
   }
}

fn connect_task_failed(e: tokio::task::JoinError) -> ChatError {
   ChatError::CryptoUnavailable(format!("Connect task failed: {}", e))
}
