//! AI chat passthrough: an OpenAI-compatible completion provider and the
//! priority message handler that forwards free chat to it.

pub mod handler;
pub mod openai;
pub mod provider;
pub mod sanitize;

pub use handler::{AssistantHandler, AssistantSettings};
pub use openai::OpenAiProvider;
pub use provider::{ChatRequest, ChatResponse, LlmProvider, Message, ProviderError, Role};
