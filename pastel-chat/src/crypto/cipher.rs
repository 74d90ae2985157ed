use aes_gcm::{
   aead::{Aead, KeyInit},
   Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use super::types::{SharedSecret, NONCE_SIZE};
use crate::error::{ChatError, Result};
use crate::models::EncryptedPacket;

/// Encrypt a message using AES-256-GCM under a fresh random nonce
pub fn encrypt(shared_secret: &SharedSecret, plaintext: &str) -> Result<EncryptedPacket> {
   let mut nonce_bytes = [0u8; NONCE_SIZE];
   OsRng
      .try_fill_bytes(&mut nonce_bytes)
      .map_err(|e| ChatError::EncryptionError(format!("Nonce generation failed: {}", e)))?;
   let nonce = Nonce::from_slice(&nonce_bytes);

   let cipher = Aes256Gcm::new_from_slice(shared_secret.as_bytes())
      .map_err(|_| ChatError::EncryptionError("Failed to create cipher".to_string()))?;

   let ciphertext = cipher
      .encrypt(nonce, plaintext.as_bytes())
      .map_err(|_| ChatError::EncryptionError("AEAD seal failed".to_string()))?;

   Ok(EncryptedPacket {
      ciphertext: STANDARD.encode(ciphertext),
      iv: STANDARD.encode(nonce_bytes),
   })
}

/// Decrypt a message using AES-256-GCM
pub fn decrypt(shared_secret: &SharedSecret, ciphertext: &str, iv: &str) -> Result<String> {
   let iv_bytes = STANDARD
      .decode(iv)
      .map_err(|e| ChatError::MalformedPacket(format!("iv is not valid base64: {}", e)))?;
   let nonce_bytes: [u8; NONCE_SIZE] = iv_bytes.as_slice().try_into().map_err(|_| {
      ChatError::MalformedPacket(format!(
         "iv must be {} bytes, got {}",
         NONCE_SIZE,
         iv_bytes.len()
      ))
   })?;
   let nonce = Nonce::from_slice(&nonce_bytes);

   let ciphertext = STANDARD
      .decode(ciphertext)
      .map_err(|e| ChatError::MalformedPacket(format!("ciphertext is not valid base64: {}", e)))?;

   let cipher = Aes256Gcm::new_from_slice(shared_secret.as_bytes())
      .map_err(|_| ChatError::EncryptionError("Failed to create cipher".to_string()))?;

   let plaintext = cipher
      .decrypt(nonce, ciphertext.as_ref())
      .map_err(|_| ChatError::AuthenticationFailure)?;

   String::from_utf8(plaintext)
      .map_err(|_| ChatError::MalformedPacket("Plaintext is not valid UTF-8".to_string()))
}

pub fn decrypt_packet(shared_secret: &SharedSecret, packet: &EncryptedPacket) -> Result<String> {
   decrypt(shared_secret, &packet.ciphertext, &packet.iv)
}
