use p256::SecretKey;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use super::types::{KeyPair, KEY_SIZE};
use crate::error::{ChatError, Result};

/// Out-of-range scalars turn up with probability ~2^-32 per draw
const MAX_SCALAR_ATTEMPTS: usize = 8;

/// Generate a new ephemeral P-256 key pair from the OS random source
pub fn generate_key_pair() -> Result<KeyPair> {
   let mut seed = Zeroizing::new([0u8; KEY_SIZE]);

   for _ in 0..MAX_SCALAR_ATTEMPTS {
      OsRng
         .try_fill_bytes(&mut seed[..])
         .map_err(|e| ChatError::CryptoUnavailable(format!("OS random source failed: {}", e)))?;

      // Rejects zero and values >= the group order
      if let Ok(private_key) = SecretKey::from_slice(&seed[..]) {
         return Ok(KeyPair::new(private_key));
      }
   }

   Err(ChatError::CryptoUnavailable(
      "Could not draw a valid P-256 scalar".to_string(),
   ))
}
