use serde::{Deserialize, Serialize};

/// Chat payload exchanged over the transport.
///
/// Both fields are standard base64. `ciphertext` includes the GCM tag and
/// `iv` is the 12-byte nonce it was sealed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPacket {
   pub ciphertext: String,
   pub iv: String,
}
