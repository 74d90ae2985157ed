use super::message::Message;

/// Ordered chat history. Messages are appended and never edited.
#[derive(Debug, Default, Clone)]
pub struct ChatHistory {
   messages: Vec<Message>,
}

impl ChatHistory {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn push(&mut self, message: Message) {
      self.messages.push(message);
   }

   pub fn clear(&mut self) {
      self.messages.clear();
   }

   pub fn len(&self) -> usize {
      self.messages.len()
   }

   pub fn is_empty(&self) -> bool {
      self.messages.is_empty()
   }

   pub fn iter(&self) -> impl Iterator<Item = &Message> {
      self.messages.iter()
   }

   pub fn to_vec(&self) -> Vec<Message> {
      self.messages.clone()
   }
}
