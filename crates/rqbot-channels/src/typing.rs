//! Typing indicator — sends `Presence::Composing` every 6 seconds.
//!
//! WhatsApp drops the "typing…" state after a few seconds, so the loop
//! refreshes it until `TypingHandle::stop()` aborts it and resets presence.

use std::time::Duration;

use tracing::debug;

use crate::transport::SharedTransport;
use crate::types::Presence;

const REFRESH_INTERVAL: Duration = Duration::from_secs(6);

/// Handle to a background typing indicator task.
///
/// Call `stop()` once the response is ready. Dropping the handle aborts the
/// loop too, but only `stop()` sends the final `Paused` presence.
pub struct TypingHandle {
    task: tokio::task::JoinHandle<()>,
    transport: SharedTransport,
    conversation_id: String,
}

impl TypingHandle {
    /// Spawn the typing indicator loop for `conversation_id`.
    pub fn start(transport: SharedTransport, conversation_id: &str) -> Self {
        let t = transport.clone();
        let conv = conversation_id.to_string();
        let task = tokio::spawn(async move {
            loop {
                if let Err(e) = t.send_presence(&conv, Presence::Composing).await {
                    debug!(conversation = %conv, error = %e, "typing refresh failed");
                }
                tokio::time::sleep(REFRESH_INTERVAL).await;
            }
        });
        Self {
            task,
            transport,
            conversation_id: conversation_id.to_string(),
        }
    }

    /// Abort the loop and clear the indicator.
    pub async fn stop(self) {
        self.task.abort();
        let _ = self
            .transport
            .send_presence(&self.conversation_id, Presence::Paused)
            .await;
    }
}

impl Drop for TypingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
