use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::TransportError,
    types::{ChatEvent, Presence},
};

/// Shared handle passed to the router and every message handler.
pub type SharedTransport = Arc<dyn Transport>;

/// Outbound half of the chat transport.
///
/// The session lifecycle (pairing, reconnects) belongs to the implementation;
/// the router only needs to reply, signal presence and react.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Participant id of the bot account, when the session knows it.
    fn own_id(&self) -> Option<String>;

    /// Deliver a plain text message to a conversation.
    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<(), TransportError>;

    /// Update the bot's presence in a conversation.
    async fn send_presence(
        &self,
        conversation_id: &str,
        presence: Presence,
    ) -> Result<(), TransportError>;

    /// React to a message. An empty `emoji` removes the bot's reaction.
    async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), TransportError>;

    /// `true` when the bot's own id is in the event's mention list.
    ///
    /// Always `false` while the own id is unknown.
    fn is_mentioned(&self, event: &ChatEvent) -> bool {
        self.own_id().is_some_and(|me| event.mentions(&me))
    }
}
