mod history;
pub mod input;
mod message;
mod packet;

pub use history::ChatHistory;
pub use message::{Message, Sender};
pub use packet::EncryptedPacket;
