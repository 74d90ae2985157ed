use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message, from the local peer's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
   #[serde(rename = "me")]
   Local,
   #[serde(rename = "peer")]
   Peer,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
   pub id: String,
   pub content: String,
   pub sender: Sender,
   /// Milliseconds since the Unix epoch
   pub timestamp: i64,
}

impl Message {
   pub fn new(content: String, sender: Sender) -> Self {
      Self {
         id: Uuid::new_v4().to_string(),
         content,
         sender,
         timestamp: chrono::Utc::now().timestamp_millis(),
      }
   }
}
