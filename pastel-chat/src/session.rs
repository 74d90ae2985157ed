//! Session state machine.
//!
//! `Idle -> KeysReady -> Connecting -> Connected`. A failed connect returns to
//! `KeysReady` so the caller can retry with another peer key. There is no
//! closed state: dropping the controller releases the key material.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::crypto::{self, KeyPair, SharedSecret};
use crate::error::{ChatError, Result};
use crate::models::EncryptedPacket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
   Idle,
   KeysReady,
   Connecting,
   Connected,
}

/// Drives key exchange and message protection for one session
pub struct SessionController {
   state: SessionState,
   key_pair: Option<KeyPair>,
   public_key: Option<String>,
   shared_secret: Option<SharedSecret>,
}

impl Default for SessionController {
   fn default() -> Self {
      Self::new()
   }
}

impl SessionController {
   pub fn new() -> Self {
      Self {
         state: SessionState::Idle,
         key_pair: None,
         public_key: None,
         shared_secret: None,
      }
   }

   pub fn state(&self) -> SessionState {
      self.state
   }

   pub fn is_connected(&self) -> bool {
      self.state == SessionState::Connected
   }

   /// Serialized local public key, once started
   pub fn public_key(&self) -> Option<&str> {
      self.public_key.as_deref()
   }

   /// Generate the session key pair and return the public key to hand to the peer
   pub fn start(&mut self) -> Result<String> {
      if self.state != SessionState::Idle {
         return Err(ChatError::AlreadyStarted);
      }

      let key_pair = crypto::generate_key_pair()?;
      let public_key = crypto::export_public(&key_pair.public_key)?;

      info!(
         fingerprint = %key_pair.public_key.fingerprint(),
         "Session keys ready"
      );

      self.key_pair = Some(key_pair);
      self.public_key = Some(public_key.clone());
      self.state = SessionState::KeysReady;

      Ok(public_key)
   }

   /// Import the peer's serialized public key and derive the session key
   pub fn connect(&mut self, peer_public_key: &str) -> Result<()> {
      self.begin_connect()?;
      self.complete_connect(peer_public_key)
   }

   /// Enter `Connecting`. The session stays there until
   /// [`complete_connect`](Self::complete_connect) or
   /// [`cancel_connect`](Self::cancel_connect).
   pub fn begin_connect(&mut self) -> Result<()> {
      match self.state {
         SessionState::Idle => Err(ChatError::NotStarted),
         SessionState::Connecting => Err(ChatError::ConnectInProgress),
         SessionState::Connected => Err(ChatError::AlreadyConnected),
         SessionState::KeysReady => {
            self.state = SessionState::Connecting;
            debug!("Session connecting");
            Ok(())
         }
      }
   }

   /// Finish a connect started with [`begin_connect`](Self::begin_connect)
   pub fn complete_connect(&mut self, peer_public_key: &str) -> Result<()> {
      match self.state {
         SessionState::Connecting => {}
         SessionState::Idle => return Err(ChatError::NotStarted),
         SessionState::Connected => return Err(ChatError::AlreadyConnected),
         SessionState::KeysReady => return Err(ChatError::NotConnecting),
      }
      let key_pair = self.key_pair.as_ref().ok_or(ChatError::NotStarted)?;

      let outcome = crypto::import_public(peer_public_key).and_then(|peer| {
         let secret = crypto::derive_shared_secret(key_pair.private_key(), &peer)?;
         Ok((secret, peer.fingerprint()))
      });

      match outcome {
         Ok((secret, peer_fingerprint)) => {
            self.shared_secret = Some(secret);
            self.state = SessionState::Connected;
            info!(peer = %peer_fingerprint, "Session connected");
            Ok(())
         }
         Err(e) => {
            self.state = SessionState::KeysReady;
            match &e {
               ChatError::DerivationError(_) => {
                  warn!("Rejected degenerate peer key, possible attack: {}", e)
               }
               _ => warn!("Rejected peer key: {}", e),
            }
            Err(e)
         }
      }
   }

   /// Abandon a pending connect. Returns whether one was pending.
   pub fn cancel_connect(&mut self) -> bool {
      if self.state != SessionState::Connecting {
         return false;
      }
      self.state = SessionState::KeysReady;
      info!("Connect cancelled");
      true
   }

   /// Encrypt an outgoing message
   pub fn send(&self, plaintext: &str) -> Result<EncryptedPacket> {
      crypto::encrypt(self.connected_secret()?, plaintext)
   }

   /// Decrypt an inbound packet.
   ///
   /// Packets that fail authentication or do not decode are discarded and
   /// yield `Ok(None)`; the session stays connected.
   pub fn receive(&self, packet: &EncryptedPacket) -> Result<Option<String>> {
      let secret = self.connected_secret()?;

      match crypto::decrypt_packet(secret, packet) {
         Ok(plaintext) => Ok(Some(plaintext)),
         Err(e) if e.is_packet_rejection() => {
            debug!("Discarding inbound packet: {}", e);
            Ok(None)
         }
         Err(e) => Err(e),
      }
   }

   fn connected_secret(&self) -> Result<&SharedSecret> {
      match (&self.state, &self.shared_secret) {
         (SessionState::Connected, Some(secret)) => Ok(secret),
         _ => Err(ChatError::NotConnected),
      }
   }
}
