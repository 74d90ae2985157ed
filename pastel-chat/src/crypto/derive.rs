use hkdf::Hkdf;
use p256::SecretKey;
use sha2::Sha256;

use super::types::{PublicKey, SharedSecret};
use crate::error::{ChatError, Result};

/// HKDF info string binding derived keys to this protocol
const SESSION_KEY_INFO: &[u8] = b"pastel-e2e-session";

/// Derive the symmetric session key using P-256 ECDH and HKDF-SHA256
pub fn derive_shared_secret(
   private_key: &SecretKey,
   peer_public_key: &PublicKey,
) -> Result<SharedSecret> {
   let peer_point = peer_public_key.as_point().ok_or_else(|| {
      ChatError::DerivationError("Peer public key is the identity element".to_string())
   })?;

   let shared = p256::ecdh::diffie_hellman(private_key.to_nonzero_scalar(), peer_point.as_affine());

   let hk = Hkdf::<Sha256>::new(None, shared.raw_secret_bytes());
   let mut secret = SharedSecret::zeroed();
   hk.expand(SESSION_KEY_INFO, secret.as_mut_bytes())
      .map_err(|_| ChatError::DerivationError("HKDF expansion failed".to_string()))?;

   Ok(secret)
}
