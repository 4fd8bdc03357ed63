//! Priority handler that forwards free chat to the completion provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rqbot_channels::{ChatEvent, SharedTransport, TypingHandle};
use rqbot_core::config::AssistantConfig;
use rqbot_hooks::{HandlerError, MessageHandler};
use tracing::{debug, warn};

use crate::openai::OpenAiProvider;
use crate::provider::{ChatRequest, ChatResponse, LlmProvider, Message, ProviderError};
use crate::sanitize::sanitize;

pub const EMPTY_ANSWER: &str = "⚠️ (resposta vazia)";
pub const UNAUTHORIZED_REPLY: &str =
    "🔒 Sem permissão (401/403). Verifique a OPENROUTER_API_KEY / modelo.";
pub const RATE_LIMITED_REPLY: &str = "⏳ Limite de uso (429). Tente novamente em alguns minutos.";
pub const TIMEOUT_REPLY: &str = "⌛ Tempo esgotado (timeout). Tente de novo.";
pub const FAILURE_REPLY: &str = "⚠️ Problema ao falar com a IA agora. Tente novamente.";

const PENDING_REACTION: &str = "⌛";

/// Texts starting with one of these are commands for someone else.
const COMMAND_PREFIXES: [char; 3] = ['!', '/', '.'];

/// Per-request settings taken from `[assistant]`.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl From<&AssistantConfig> for AssistantSettings {
    fn from(cfg: &AssistantConfig) -> Self {
        Self {
            model: cfg.model.clone(),
            system_prompt: cfg.system_prompt.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

pub struct AssistantHandler {
    /// `None` when no API key is configured; the handler then declines
    /// every event so the router's onboarding reply takes over.
    provider: Option<Arc<dyn LlmProvider>>,
    settings: AssistantSettings,
}

impl AssistantHandler {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, settings: AssistantSettings) -> Self {
        Self { provider, settings }
    }

    /// Build the handler from configuration, wiring an OpenAI-compatible
    /// provider when an API key is present.
    pub fn from_config(cfg: &AssistantConfig) -> Self {
        let provider = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|key| {
                Arc::new(
                    OpenAiProvider::new(key.to_string(), Some(cfg.base_url.clone()))
                        .with_attribution(&cfg.referrer, &cfg.title),
                ) as Arc<dyn LlmProvider>
            });
        Self::new(provider, AssistantSettings::from(cfg))
    }

    async fn ask(&self, provider: &dyn LlmProvider, text: &str) -> Result<ChatResponse, ProviderError> {
        let req = ChatRequest {
            model: self.settings.model.clone(),
            system: self.settings.system_prompt.clone(),
            messages: vec![Message::user(text)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match tokio::time::timeout(self.settings.timeout, provider.send(&req)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                ms: self.settings.timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl MessageHandler for AssistantHandler {
    async fn on_message(
        &self,
        transport: &SharedTransport,
        event: &ChatEvent,
        is_group: bool,
    ) -> Result<bool, HandlerError> {
        if is_group && !transport.is_mentioned(event) {
            return Ok(false);
        }

        let text = event.text.trim();
        if text.is_empty() || text.starts_with(COMMAND_PREFIXES) {
            return Ok(false);
        }

        let conv = event.conversation_id.as_str();
        let Some(provider) = self.provider.as_deref() else {
            debug!(conversation = %conv, "assistant disabled, declining");
            return Ok(false);
        };

        let typing = TypingHandle::start(Arc::clone(transport), conv);
        react(transport, event, PENDING_REACTION).await;

        let result = self.ask(provider, text).await;

        typing.stop().await;
        react(transport, event, "").await;

        let reply = match result {
            Ok(resp) => {
                let clean = sanitize(&resp.content);
                debug!(
                    conversation = %conv,
                    model = %resp.model,
                    tokens_in = resp.tokens_in,
                    tokens_out = resp.tokens_out,
                    stop_reason = %resp.stop_reason,
                    chars = clean.len(),
                    "assistant answered"
                );
                if clean.is_empty() {
                    EMPTY_ANSWER.to_string()
                } else {
                    clean
                }
            }
            Err(e) => {
                warn!(conversation = %conv, provider = provider.name(), error = %e, "assistant request failed");
                failure_reply(&e).to_string()
            }
        };

        // Claimed even when delivery fails.
        if let Err(e) = transport.send_text(conv, &reply).await {
            warn!(conversation = %conv, error = %e, "could not deliver assistant reply");
        }
        Ok(true)
    }
}

fn failure_reply(e: &ProviderError) -> &'static str {
    match e {
        e if e.is_unauthorized() => UNAUTHORIZED_REPLY,
        ProviderError::RateLimited { .. } => RATE_LIMITED_REPLY,
        ProviderError::Timeout { .. } => TIMEOUT_REPLY,
        _ => FAILURE_REPLY,
    }
}

/// Best-effort reaction on the user's message; failures are ignored.
async fn react(transport: &SharedTransport, event: &ChatEvent, emoji: &str) {
    if event.id.is_empty() {
        return;
    }
    let _ = transport
        .react(&event.conversation_id, &event.id, emoji)
        .await;
}
