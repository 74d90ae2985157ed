//! Outgoing message DTO with garde validation.
//!
//! Content is checked before it reaches the cipher.

use garde::Validate;

use crate::error::ChatError;

/// Validation context: the configured maximum length in characters
pub struct MessageLimits {
   pub max_len: usize,
}

fn validate_content(value: &str, ctx: &MessageLimits) -> garde::Result {
   if value.trim().is_empty() {
      return Err(garde::Error::new("Message cannot be empty"));
   }
   let len = value.chars().count();
   if len > ctx.max_len {
      return Err(garde::Error::new(format!(
         "Message too long ({} characters, max {})",
         len, ctx.max_len
      )));
   }
   Ok(())
}

/// Input for sending a message
#[derive(Debug, Validate)]
#[garde(context(MessageLimits))]
pub struct OutgoingMessage {
   #[garde(custom(validate_content))]
   pub content: String,
}

impl OutgoingMessage {
   /// Validate and convert the garde report into a chat error
   pub fn validate_input(&self, limits: &MessageLimits) -> Result<(), ChatError> {
      self.validate_with(limits)
         .map_err(|e| ChatError::InvalidMessage(e.to_string()))
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   fn check(content: &str, max_len: usize) -> Result<(), garde::Report> {
      OutgoingMessage {
         content: content.to_string(),
      }
      .validate_with(&MessageLimits { max_len })
   }

   #[test]
   fn test_valid_content() {
      assert!(check("hello", 10).is_ok());
      assert!(check("  padded  ", 10).is_ok());
      assert!(check("ünïcødé", 7).is_ok());
   }

   #[test]
   fn test_blank_content_rejected() {
      assert!(check("", 10).is_err());
      let report = check("   \n\t", 10).unwrap_err();
      assert!(report.to_string().contains("empty"));
   }

   #[test]
   fn test_length_counts_characters() {
      assert!(check("12345", 5).is_ok());
      let report = check("123456", 5).unwrap_err();
      assert!(report.to_string().contains("too long"));
   }

   #[test]
   fn test_validate_input_maps_to_chat_error() {
      let msg = OutgoingMessage {
         content: " ".to_string(),
      };
      let result = msg.validate_input(&MessageLimits { max_len: 10 });
      assert!(matches!(result, Err(ChatError::InvalidMessage(_))));
   }
}
