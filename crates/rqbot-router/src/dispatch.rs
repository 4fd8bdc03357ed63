//! Executes parsed commands against the media backend.

use std::sync::Arc;

use rqbot_backend::{BackendError, Candidate, MediaBackend};
use tracing::{debug, warn};

use crate::intent::{classify_play, Command, Intent, PlayTarget};
use crate::pending::PendingSelectionStore;
use crate::replies;

/// Runs one command per call and always yields exactly one reply text.
///
/// Argument validation happens before any backend call; a backend failure
/// becomes the generic failure reply and is logged with the command name.
pub struct CommandDispatcher {
    backend: Arc<dyn MediaBackend>,
    pending: Arc<PendingSelectionStore>,
    search_limit: usize,
    queue_render_limit: usize,
}

impl CommandDispatcher {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        pending: Arc<PendingSelectionStore>,
        search_limit: usize,
        queue_render_limit: usize,
    ) -> Self {
        Self {
            backend,
            pending,
            search_limit,
            queue_render_limit,
        }
    }

    /// Execute `intent` on behalf of `sender_id` in `conversation_id`.
    pub async fn dispatch(&self, conversation_id: &str, sender_id: &str, intent: &Intent) -> String {
        debug!(conversation = %conversation_id, command = %intent.name, "dispatching command");
        let result = match intent.name {
            Command::Play => self.play(conversation_id, sender_id, &intent.argument).await,
            Command::Pause => self.backend.toggle_playback().await.map(|_| replies::TOGGLED.into()),
            Command::Next => self.backend.next().await.map(|_| replies::SKIPPED.into()),
            Command::Volume => self.volume(&intent.argument).await,
            Command::Queue => self.queue().await,
            Command::Clear => self.backend.clear_queue().await.map(|_| replies::QUEUE_CLEARED.into()),
            Command::Label => self.label(&intent.argument).await,
            Command::Help => Ok(replies::HELP_TEXT.to_string()),
        };
        self.finish(intent.name, conversation_id, result)
    }

    /// Play a candidate chosen from a pending selection.
    pub async fn play_candidate(&self, conversation_id: &str, candidate: &Candidate) -> String {
        let result = self
            .backend
            .play_video(&candidate.id)
            .await
            .map(|_| replies::streaming(&candidate.title));
        self.finish(Command::Play, conversation_id, result)
    }

    fn finish(
        &self,
        command: Command,
        conversation_id: &str,
        result: Result<String, BackendError>,
    ) -> String {
        result.unwrap_or_else(|e| {
            warn!(conversation = %conversation_id, command = %command, error = %e, "backend call failed");
            replies::BACKEND_FAILURE.to_string()
        })
    }

    async fn play(
        &self,
        conversation_id: &str,
        sender_id: &str,
        argument: &str,
    ) -> Result<String, BackendError> {
        let Some(target) = classify_play(argument) else {
            return Ok(replies::PLAY_USAGE.to_string());
        };

        match target {
            PlayTarget::Url(url) => {
                let resp = self.backend.enqueue(&url, sender_id).await?;
                if !resp.ok {
                    return Ok(replies::CONFIRMATION_REQUIRED.to_string());
                }
                Ok(replies::streaming(resp.title.as_deref().unwrap_or(&url)))
            }
            PlayTarget::LocalId(code) => {
                let Some(item) = self.backend.search_library(&code, 1).await?.into_iter().next()
                else {
                    return Ok(replies::local_not_found(&code));
                };
                self.backend.enqueue_by_id(item.db_id).await?;
                let title = if item.title.is_empty() { &code } else { &item.title };
                Ok(replies::enqueued(title))
            }
            PlayTarget::Search(query) => {
                // A new search supersedes the old list even if it finds nothing.
                self.pending.consume(conversation_id);
                let mut results = self.backend.search_videos(&query, self.search_limit).await?;
                if results.is_empty() {
                    return Ok(replies::nothing_found(&query));
                }
                results.truncate(self.search_limit);
                let listing = replies::search_listing(&query, &results);
                self.pending.put(conversation_id, results);
                Ok(listing)
            }
        }
    }

    async fn volume(&self, argument: &str) -> Result<String, BackendError> {
        let Some(value) = parse_volume(argument) else {
            return Ok(replies::VOLUME_USAGE.to_string());
        };
        self.backend.set_volume(value).await?;
        Ok(replies::volume_set(value))
    }

    async fn queue(&self) -> Result<String, BackendError> {
        let entries = self.backend.queue().await?;
        Ok(replies::queue_listing(&entries, self.queue_render_limit))
    }

    async fn label(&self, argument: &str) -> Result<String, BackendError> {
        let mut parts = argument.trim().splitn(2, char::is_whitespace);
        let code = parts.next().unwrap_or("").trim_start_matches('#');
        let text = parts.next().unwrap_or("").trim();
        if code.is_empty() || text.is_empty() {
            return Ok(replies::LABEL_USAGE.to_string());
        }
        self.backend.set_label(code, text).await?;
        Ok(replies::label_set(code, text))
    }
}

/// Integer 0–100, optionally followed by `%`.
fn parse_volume(argument: &str) -> Option<u8> {
    let digits = argument.trim().trim_end_matches('%').trim();
    let value: u8 = digits.parse().ok()?;
    (value <= 100).then_some(value)
}
