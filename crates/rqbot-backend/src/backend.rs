use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{Candidate, EnqueueResponse, ImportRequest, LibraryItem, QueueEntry};

/// Every call the router makes against the media backend.
///
/// Implementations must bound each request with a timeout.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// `POST /library/import` — register an imported media file.
    async fn import(&self, req: &ImportRequest) -> Result<(), BackendError>;

    /// `POST /library/label?code=&label=` — label a catalog entry.
    async fn set_label(&self, code: &str, label: &str) -> Result<(), BackendError>;

    /// `POST /library/search` — look up the local catalog.
    async fn search_library(&self, query: &str, limit: usize)
        -> Result<Vec<LibraryItem>, BackendError>;

    /// `POST /queue` — enqueue by URL or query. `ok: false` means the backend
    /// wants a confirmation it cannot get over chat.
    async fn enqueue(&self, query: &str, requested_by: &str)
        -> Result<EnqueueResponse, BackendError>;

    /// `POST /queue/by-id` — enqueue a catalog entry.
    async fn enqueue_by_id(&self, db_id: i64) -> Result<(), BackendError>;

    /// `POST /yt/search` — remote video search.
    async fn search_videos(&self, query: &str, limit: usize)
        -> Result<Vec<Candidate>, BackendError>;

    /// `POST /yt/play` — play a search result by id.
    async fn play_video(&self, video_id: &str) -> Result<(), BackendError>;

    /// `POST /play` — toggle play/pause.
    async fn toggle_playback(&self) -> Result<(), BackendError>;

    /// `POST /next` — skip to the next entry.
    async fn next(&self) -> Result<(), BackendError>;

    /// `POST /volume?value=` — set the output volume (0–100).
    async fn set_volume(&self, value: u8) -> Result<(), BackendError>;

    /// `GET /queue` — current playlist.
    async fn queue(&self) -> Result<Vec<QueueEntry>, BackendError>;

    /// `POST /queue/clear` — empty the playlist.
    async fn clear_queue(&self) -> Result<(), BackendError>;
}
