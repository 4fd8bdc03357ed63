//! Entry point for every inbound chat event.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use rqbot_backend::MediaBackend;
use rqbot_channels::{ChatEvent, SharedTransport};
use rqbot_core::config::RouterConfig;
use rqbot_hooks::HandlerRegistry;
use tracing::{debug, error, warn};

use crate::cooldown::Cooldown;
use crate::dispatch::CommandDispatcher;
use crate::error::RouterError;
use crate::inbox::Inbox;
use crate::intent::{self, Addressing, Command};
use crate::media::{MediaImport, MediaStore};
use crate::pending::{PendingSelectionStore, Resolution};
use crate::replies;

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sent by the bot itself.
    SelfOriginated,
    /// Group message that does not mention the bot.
    NotAddressed,
    MediaImport,
    Selection,
    Command(Command),
    /// A registered handler claimed the event.
    Handled,
    Onboarding,
    /// Onboarding was due but the sender is still cooling down.
    Suppressed,
    Fallback,
    /// Top-level guard answered with the generic error reply.
    Failed,
}

/// Orchestrates addressing, pending selections, intent parsing, command
/// dispatch and the handler chain. Sends at most one reply per event of
/// its own; handlers send theirs.
pub struct MessageRouter {
    transport: SharedTransport,
    registry: Arc<HandlerRegistry>,
    dispatcher: CommandDispatcher,
    pending: Arc<PendingSelectionStore>,
    media: MediaImport,
    onboarding: Cooldown,
    inbox: Inbox<ChatEvent>,
    allow_from_me: bool,
}

impl MessageRouter {
    pub fn new(
        config: &RouterConfig,
        transport: SharedTransport,
        backend: Arc<dyn MediaBackend>,
        store: Arc<dyn MediaStore>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        let pending = Arc::new(PendingSelectionStore::new());
        Self {
            transport,
            registry,
            dispatcher: CommandDispatcher::new(
                Arc::clone(&backend),
                Arc::clone(&pending),
                config.search_limit,
                config.queue_render_limit,
            ),
            pending,
            media: MediaImport::new(store, backend),
            onboarding: Cooldown::new(Duration::from_secs(config.onboarding_cooldown_secs)),
            inbox: Inbox::new(),
            allow_from_me: config.allow_from_me,
        }
    }

    pub fn pending(&self) -> &PendingSelectionStore {
        &self.pending
    }

    /// Queue `event` behind earlier events of its conversation.
    ///
    /// Each conversation is drained by a single spawned worker, so events
    /// are routed in the order they were submitted while different
    /// conversations proceed concurrently. Must be called inside a Tokio
    /// runtime.
    pub fn submit(self: &Arc<Self>, event: ChatEvent) {
        let conversation_id = event.conversation_id.clone();
        if self.inbox.push(&conversation_id, event) {
            let router = Arc::clone(self);
            tokio::spawn(async move { router.drain(conversation_id).await });
        }
    }

    /// `true` once every submitted event has been routed.
    pub fn is_idle(&self) -> bool {
        self.inbox.active() == 0
    }

    async fn drain(&self, conversation_id: String) {
        while let Some(event) = self.inbox.pop(&conversation_id) {
            self.handle(event).await;
        }
    }

    /// Process one event to completion. Never fails: unexpected errors and
    /// panics are logged and answered with a generic error reply.
    ///
    /// Does not order events of the same conversation against each other;
    /// use [`MessageRouter::submit`] for that.
    pub async fn handle(&self, event: ChatEvent) -> Outcome {
        let outcome = match AssertUnwindSafe(self.route(&event)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(conversation = %event.conversation_id, error = %e, "event processing failed");
                self.send_generic_error(&event).await;
                Outcome::Failed
            }
            Err(_) => {
                error!(conversation = %event.conversation_id, "event processing panicked");
                self.send_generic_error(&event).await;
                Outcome::Failed
            }
        };

        debug!(conversation = %event.conversation_id, outcome = ?outcome, "event routed");
        outcome
    }

    async fn route(&self, event: &ChatEvent) -> Result<Outcome, RouterError> {
        if event.from_me && !self.allow_from_me {
            return Ok(Outcome::SelfOriginated);
        }

        let conv = event.conversation_id.as_str();
        let mentioned = event.is_group && self.transport.is_mentioned(event);
        if event.is_group && !mentioned {
            return Ok(Outcome::NotAddressed);
        }

        if let Some(attachment) = &event.attachment {
            let reply = self.media.import(conv, attachment).await;
            self.reply(conv, &reply).await?;
            return Ok(Outcome::MediaImport);
        }

        let addressed_text = if event.is_group {
            intent::strip_mentions(&event.text)
        } else {
            event.text.trim()
        };

        if let Some(resolution) = self.pending.resolve(conv, addressed_text) {
            let reply = match resolution {
                Resolution::Selected(candidate) => {
                    self.dispatcher.play_candidate(conv, &candidate).await
                }
                Resolution::Cancelled => replies::SELECTION_CANCELLED.to_string(),
                Resolution::InvalidIndex { max } => replies::invalid_index(max),
            };
            self.reply(conv, &reply).await?;
            return Ok(Outcome::Selection);
        }

        let addressing = if event.is_group {
            Addressing::Group { mentioned }
        } else {
            Addressing::Direct
        };

        if let Some(intent) = intent::parse(&event.text, addressing) {
            let reply = self.dispatcher.dispatch(conv, &event.sender_id, &intent).await;
            self.reply(conv, &reply).await?;
            return Ok(Outcome::Command(intent.name));
        }

        if self.registry.dispatch(&self.transport, event, event.is_group).await {
            return Ok(Outcome::Handled);
        }

        if event.is_group {
            self.reply(conv, replies::HELP_TEXT).await?;
            return Ok(Outcome::Fallback);
        }

        if self.onboarding.check(&event.sender_id) {
            self.reply(conv, &replies::onboarding()).await?;
            Ok(Outcome::Onboarding)
        } else {
            Ok(Outcome::Suppressed)
        }
    }

    async fn reply(&self, conversation_id: &str, text: &str) -> Result<(), RouterError> {
        self.transport.send_text(conversation_id, text).await?;
        Ok(())
    }

    async fn send_generic_error(&self, event: &ChatEvent) {
        if let Err(e) = self
            .transport
            .send_text(&event.conversation_id, replies::GENERIC_ERROR)
            .await
        {
            warn!(conversation = %event.conversation_id, error = %e, "could not deliver error reply");
        }
    }
}
