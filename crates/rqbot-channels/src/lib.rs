pub mod error;
pub mod memory;
pub mod transport;
pub mod types;
pub mod typing;

pub use error::TransportError;
pub use memory::{MemoryTransport, SentAction};
pub use transport::{SharedTransport, Transport};
pub use types::{is_group_conversation, Attachment, ChatEvent, Presence};
pub use typing::TypingHandle;
