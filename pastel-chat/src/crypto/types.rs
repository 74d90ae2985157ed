use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256-GCM key size in bytes
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes
pub const NONCE_SIZE: usize = 12;

/// P-256 public key handle.
///
/// Holds either a validated curve point or the identity element. The identity
/// has a well-formed SEC1 encoding, so import accepts it and derivation is
/// where it gets rejected.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
   point: Option<p256::PublicKey>,
}

impl PublicKey {
   pub(crate) fn identity() -> Self {
      Self { point: None }
   }

   pub(crate) fn as_point(&self) -> Option<&p256::PublicKey> {
      self.point.as_ref()
   }

   pub fn is_identity(&self) -> bool {
      self.point.is_none()
   }

   /// Short hex digest of the uncompressed point, for log lines only.
   pub fn fingerprint(&self) -> String {
      match &self.point {
         Some(point) => {
            let digest = Sha256::digest(point.to_encoded_point(false).as_bytes());
            hex::encode(&digest[..8])
         }
         None => "identity".to_string(),
      }
   }
}

impl From<p256::PublicKey> for PublicKey {
   fn from(point: p256::PublicKey) -> Self {
      Self { point: Some(point) }
   }
}

impl fmt::Debug for PublicKey {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "PublicKey({})", self.fingerprint())
   }
}

/// Ephemeral P-256 key pair owned by a single session
pub struct KeyPair {
   pub public_key: PublicKey,
   private_key: SecretKey,
}

impl KeyPair {
   pub(crate) fn new(private_key: SecretKey) -> Self {
      Self {
         public_key: PublicKey::from(private_key.public_key()),
         private_key,
      }
   }

   pub fn private_key(&self) -> &SecretKey {
      &self.private_key
   }
}

impl fmt::Debug for KeyPair {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("KeyPair")
         .field("public_key", &self.public_key)
         .finish_non_exhaustive()
   }
}

/// Symmetric session key derived from an ECDH exchange
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; KEY_SIZE]);

impl SharedSecret {
   pub(crate) fn zeroed() -> Self {
      Self([0u8; KEY_SIZE])
   }

   pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
      &self.0
   }

   pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_SIZE] {
      &mut self.0
   }
}

impl fmt::Debug for SharedSecret {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str("SharedSecret([REDACTED])")
   }
}
