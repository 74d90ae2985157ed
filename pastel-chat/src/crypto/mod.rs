//! Session cryptography: P-256 ECDH key agreement, HKDF-SHA256 key
//! derivation and AES-256-GCM message encryption.
//!
//! Public keys carry no identity binding. A party that can substitute keys on
//! the exchange path can read and forge traffic.

mod cipher;
mod derive;
mod encoding;
mod keys;
mod types;

pub use cipher::{decrypt, decrypt_packet, encrypt};
pub use derive::derive_shared_secret;
pub use encoding::{export_public, import_public};
pub use keys::generate_key_pair;
pub use types::{KeyPair, PublicKey, SharedSecret, KEY_SIZE, NONCE_SIZE};
