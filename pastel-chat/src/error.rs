//! Error types for the chat session.

use thiserror::Error;

/// Errors raised by key exchange, message encryption and session control.
#[derive(Error, Debug)]
pub enum ChatError {
   /// The OS random source or cipher provider could not produce key material.
   #[error("Crypto provider unavailable: {0}")]
   CryptoUnavailable(String),

   /// A public key handle could not be serialized.
   #[error("Failed to export public key: {0}")]
   ExportError(String),

   /// A serialized public key is not valid base64 or not a point on the curve.
   #[error("Malformed public key: {0}")]
   MalformedKey(String),

   /// The peer key cannot yield a usable shared secret.
   #[error("Key derivation failed: {0}")]
   DerivationError(String),

   #[error("Encryption failed: {0}")]
   EncryptionError(String),

   /// The AEAD tag did not verify. Wrong key, corrupted data or a packet from
   /// another session.
   #[error("Packet authentication failed")]
   AuthenticationFailure,

   /// A packet's fields could not be decoded.
   #[error("Malformed packet: {0}")]
   MalformedPacket(String),

   #[error("Session not started")]
   NotStarted,

   #[error("Session already started")]
   AlreadyStarted,

   #[error("Session already connected")]
   AlreadyConnected,

   #[error("Connect already in progress")]
   ConnectInProgress,

   #[error("No connect in progress")]
   NotConnecting,

   #[error("Session not connected")]
   NotConnected,

   /// Outgoing message content was rejected before encryption.
   #[error("Invalid message: {0}")]
   InvalidMessage(String),

   #[error("Invalid configuration: {0}")]
   Config(String),

   #[error("Transport error: {0}")]
   Transport(String),

   #[error("Serialization failed: {0}")]
   Serialization(#[from] serde_json::Error),
}

impl ChatError {
   /// Whether the session survives this error and the caller may retry with
   /// different input.
   pub fn is_recoverable(&self) -> bool {
      !matches!(
         self,
         ChatError::CryptoUnavailable(_)
            | ChatError::Config(_)
            | ChatError::NotStarted
            | ChatError::AlreadyStarted
            | ChatError::AlreadyConnected
            | ChatError::ConnectInProgress
            | ChatError::NotConnecting
            | ChatError::NotConnected
      )
   }

   /// Errors that mean "drop this inbound packet" and nothing more.
   pub fn is_packet_rejection(&self) -> bool {
      matches!(
         self,
         ChatError::AuthenticationFailure | ChatError::MalformedPacket(_)
      )
   }
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_misuse_errors_are_not_recoverable() {
      assert!(!ChatError::NotConnected.is_recoverable());
      assert!(!ChatError::AlreadyStarted.is_recoverable());
      assert!(!ChatError::NotStarted.is_recoverable());
      assert!(!ChatError::ConnectInProgress.is_recoverable());
      assert!(!ChatError::CryptoUnavailable("rng".into()).is_recoverable());
   }

   #[test]
   fn test_key_errors_are_recoverable() {
      assert!(ChatError::MalformedKey("bad".into()).is_recoverable());
      assert!(ChatError::DerivationError("identity".into()).is_recoverable());
      assert!(ChatError::AuthenticationFailure.is_recoverable());
   }

   #[test]
   fn test_packet_rejection_classification() {
      assert!(ChatError::AuthenticationFailure.is_packet_rejection());
      assert!(ChatError::MalformedPacket("iv".into()).is_packet_rejection());
      assert!(!ChatError::MalformedKey("x".into()).is_packet_rejection());
      assert!(!ChatError::NotConnected.is_packet_rejection());
   }

   #[test]
   fn test_error_messages() {
      assert_eq!(
         ChatError::MalformedKey("not base64".into()).to_string(),
         "Malformed public key: not base64"
      );
      assert_eq!(ChatError::NotConnected.to_string(), "Session not connected");
   }
}
