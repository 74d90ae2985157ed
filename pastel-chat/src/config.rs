//! Chat configuration loaded from the environment.

use garde::Validate;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ChatError, Result};

pub const DEFAULT_CHANNEL_NAME: &str = "pastel-secure-chat-demo";
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 10_000;

const MAX_CHANNEL_NAME_LENGTH: usize = 128;
const MAX_MESSAGE_LEN_LIMIT: usize = 65_536;

pub const ENV_CHANNEL_NAME: &str = "PASTEL_CHANNEL_NAME";
pub const ENV_CONNECT_DELAY_MS: &str = "PASTEL_CONNECT_DELAY_MS";
pub const ENV_MAX_MESSAGE_LEN: &str = "PASTEL_MAX_MESSAGE_LEN";

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[garde(context(()))]
pub struct ChatConfig {
   /// Name of the broadcast channel peers meet on
   #[garde(length(min = 1, max = MAX_CHANNEL_NAME_LENGTH))]
   pub channel_name: String,
   /// Pause before a connect attempt starts deriving keys
   #[garde(skip)]
   pub connect_delay: Duration,
   /// Longest outgoing message, in characters
   #[garde(range(min = 1, max = MAX_MESSAGE_LEN_LIMIT))]
   pub max_message_len: usize,
}

impl Default for ChatConfig {
   fn default() -> Self {
      Self {
         channel_name: DEFAULT_CHANNEL_NAME.to_string(),
         connect_delay: Duration::ZERO,
         max_message_len: DEFAULT_MAX_MESSAGE_LEN,
      }
   }
}

impl ChatConfig {
   /// Load from process environment, reading a `.env` file first if present
   pub fn from_env() -> Result<Self> {
      if let Ok(path) = dotenvy::dotenv() {
         info!(path = %path.display(), "Loaded environment file");
      }
      Self::from_lookup(|key| std::env::var(key).ok())
   }

   /// Build from an arbitrary key lookup. Unparsable values fall back to defaults.
   pub fn from_lookup<F>(lookup: F) -> Result<Self>
   where
      F: Fn(&str) -> Option<String>,
   {
      let defaults = Self::default();

      let channel_name = lookup(ENV_CHANNEL_NAME).unwrap_or(defaults.channel_name);

      let connect_delay = parse_var::<_, u64>(&lookup, ENV_CONNECT_DELAY_MS)
         .map(Duration::from_millis)
         .unwrap_or(defaults.connect_delay);

      let max_message_len =
         parse_var(&lookup, ENV_MAX_MESSAGE_LEN).unwrap_or(defaults.max_message_len);

      let config = Self {
         channel_name,
         connect_delay,
         max_message_len,
      };
      config
         .validate()
         .map_err(|e| ChatError::Config(e.to_string()))?;
      Ok(config)
   }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
   F: Fn(&str) -> Option<String>,
   T: std::str::FromStr,
{
   let raw = lookup(key)?;
   match raw.trim().parse() {
      Ok(value) => Some(value),
      Err(_) => {
         warn!(key, value = %raw, "Ignoring unparsable config value");
         None
      }
   }
}
