//! In-process transport that records every outbound action.
//!
//! Backs the test suites of the router, registry and assistant crates.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;

use crate::{error::TransportError, transport::Transport, types::Presence};

/// One recorded outbound action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentAction {
    Text {
        conversation_id: String,
        text: String,
    },
    Presence {
        conversation_id: String,
        presence: Presence,
    },
    React {
        conversation_id: String,
        message_id: String,
        emoji: String,
    },
}

pub struct MemoryTransport {
    own_id: Option<String>,
    actions: Mutex<Vec<SentAction>>,
    fail_text: AtomicBool,
}

impl MemoryTransport {
    pub fn new(own_id: Option<&str>) -> Self {
        Self {
            own_id: own_id.map(String::from),
            actions: Mutex::new(Vec::new()),
            fail_text: AtomicBool::new(false),
        }
    }

    /// Make subsequent `send_text` calls fail with `SendFailed`.
    pub fn fail_text_sends(&self, fail: bool) {
        self.fail_text.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of everything sent so far, in order.
    pub fn actions(&self) -> Vec<SentAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the text replies, in order.
    pub fn texts(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                SentAction::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: SentAction) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn own_id(&self) -> Option<String> {
        self.own_id.clone()
    }

    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<(), TransportError> {
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("memory transport set to fail".into()));
        }
        self.record(SentAction::Text {
            conversation_id: conversation_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_presence(
        &self,
        conversation_id: &str,
        presence: Presence,
    ) -> Result<(), TransportError> {
        self.record(SentAction::Presence {
            conversation_id: conversation_id.to_string(),
            presence,
        });
        Ok(())
    }

    async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), TransportError> {
        self.record(SentAction::React {
            conversation_id: conversation_id.to_string(),
            message_id: message_id.to_string(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }
}
