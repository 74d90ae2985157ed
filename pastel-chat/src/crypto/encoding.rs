//! Public key serialization.
//!
//! Keys travel as standard base64 of the uncompressed SEC1 point
//! (`0x04 || X || Y`, 65 bytes).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::EncodedPoint;

use super::types::PublicKey;
use crate::error::{ChatError, Result};

/// Serialize a public key for the key-exchange payload
pub fn export_public(public_key: &PublicKey) -> Result<String> {
   let point = public_key.as_point().ok_or_else(|| {
      ChatError::ExportError("Identity element has no exportable encoding".to_string())
   })?;

   Ok(STANDARD.encode(point.to_encoded_point(false).as_bytes()))
}

/// Parse a serialized public key, validating curve membership
pub fn import_public(serialized: &str) -> Result<PublicKey> {
   let bytes = STANDARD
      .decode(serialized.trim())
      .map_err(|e| ChatError::MalformedKey(format!("Not valid base64: {}", e)))?;

   let encoded = EncodedPoint::from_bytes(&bytes)
      .map_err(|e| ChatError::MalformedKey(format!("Invalid SEC1 encoding: {}", e)))?;

   if encoded.is_identity() {
      return Ok(PublicKey::identity());
   }

   let point: Option<p256::PublicKey> = p256::PublicKey::from_encoded_point(&encoded).into();
   point
      .map(PublicKey::from)
      .ok_or_else(|| ChatError::MalformedKey("Point is not on the P-256 curve".to_string()))
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::crypto::generate_key_pair;

   #[test]
   fn test_export_import_round_trip() {
      let pair = generate_key_pair().unwrap();
      let exported = export_public(&pair.public_key).unwrap();
      let imported = import_public(&exported).unwrap();

      assert_eq!(imported, pair.public_key);
      assert_eq!(export_public(&imported).unwrap(), exported);
   }

   #[test]
   fn test_export_is_uncompressed_sec1() {
      let pair = generate_key_pair().unwrap();
      let exported = export_public(&pair.public_key).unwrap();
      let bytes = STANDARD.decode(&exported).unwrap();

      assert_eq!(bytes.len(), 65);
      assert_eq!(bytes[0], 0x04);
      // Deterministic
      assert_eq!(export_public(&pair.public_key).unwrap(), exported);
   }

   #[test]
   fn test_import_tolerates_surrounding_whitespace() {
      let pair = generate_key_pair().unwrap();
      let exported = export_public(&pair.public_key).unwrap();
      let pasted = format!("  {}\n", exported);
      assert_eq!(import_public(&pasted).unwrap(), pair.public_key);
   }

   #[test]
   fn test_import_accepts_compressed_points() {
      let pair = generate_key_pair().unwrap();
      let compressed = pair
         .public_key
         .as_point()
         .unwrap()
         .to_encoded_point(true);
      let imported = import_public(&STANDARD.encode(compressed.as_bytes())).unwrap();
      assert_eq!(imported, pair.public_key);
   }

   #[test]
   fn test_import_rejects_non_base64() {
      let result = import_public("definitely not a key!");
      assert!(matches!(result, Err(ChatError::MalformedKey(_))));

      let result = import_public("");
      assert!(matches!(result, Err(ChatError::MalformedKey(_))));
   }

   #[test]
   fn test_import_rejects_url_safe_alphabet() {
      let result = import_public("BA-_");
      assert!(matches!(result, Err(ChatError::MalformedKey(_))));
   }

   #[test]
   fn test_import_rejects_point_off_curve() {
      // (1, 1) does not satisfy y^2 = x^3 - 3x + b
      let mut bytes = vec![0x04];
      let mut coord = [0u8; 32];
      coord[31] = 1;
      bytes.extend_from_slice(&coord);
      bytes.extend_from_slice(&coord);

      let result = import_public(&STANDARD.encode(&bytes));
      match result {
         Err(ChatError::MalformedKey(msg)) => assert!(msg.contains("not on the P-256 curve")),
         other => panic!("Expected MalformedKey, got {:?}", other),
      }
   }

   #[test]
   fn test_import_rejects_truncated_point() {
      let pair = generate_key_pair().unwrap();
      let mut bytes = STANDARD
         .decode(export_public(&pair.public_key).unwrap())
         .unwrap();
      bytes.truncate(40);

      let result = import_public(&STANDARD.encode(&bytes));
      assert!(matches!(result, Err(ChatError::MalformedKey(_))));
   }

   #[test]
   fn test_import_rejects_unknown_sec1_tag() {
      let mut bytes = vec![0x07];
      bytes.extend_from_slice(&[0xAB; 64]);
      let result = import_public(&STANDARD.encode(&bytes));
      assert!(matches!(result, Err(ChatError::MalformedKey(_))));
   }

   #[test]
   fn test_identity_imports_but_cannot_export() {
      let identity = import_public(&STANDARD.encode([0x00])).unwrap();
      assert!(identity.is_identity());

      let result = export_public(&identity);
      assert!(matches!(result, Err(ChatError::ExportError(_))));
   }
}
