pub mod relay_client;
pub mod render;
pub mod transcript;

pub use relay_client::{ChatReply, RelayCallError, RelayClient, DEFAULT_RELAY_URL};
pub use transcript::{ChatMessage, ChatState, Sender};
