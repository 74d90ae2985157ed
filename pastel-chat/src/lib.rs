//! Pastel secure chat core.
//!
//! Two peers each generate an ephemeral P-256 key pair, swap serialized public
//! keys out of band, derive a shared AES-256-GCM key and exchange encrypted
//! text packets over any transport that moves opaque byte blobs.
//!
//! Public keys are not bound to any identity. The exchange is open to an
//! active man-in-the-middle.

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod session;

pub use client::{ChatClient, Transport};
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use models::{ChatHistory, EncryptedPacket, Message, Sender};
pub use session::{SessionController, SessionState};
