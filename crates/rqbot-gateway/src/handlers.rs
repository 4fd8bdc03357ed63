//! Handlers this binary can register, selected by the `handlers` manifest.

use std::sync::Arc;

use rqbot_assistant::AssistantHandler;
use rqbot_core::RqbotConfig;
use rqbot_hooks::{HandlerCatalog, HandlerDescriptor};

pub const ASSISTANT: &str = "assistant";

pub fn catalog(config: &RqbotConfig) -> HandlerCatalog {
    let assistant = config.assistant.clone();
    HandlerCatalog::new().provide(ASSISTANT, move || {
        HandlerDescriptor::new(
            ASSISTANT,
            Arc::new(AssistantHandler::from_config(&assistant)),
        )
        .with_priority()
    })
}
