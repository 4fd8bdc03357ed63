use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::backend::MediaBackend;
use crate::error::BackendError;
use crate::types::{
    Candidate, EnqueueResponse, ImportRequest, LibraryItem, LibrarySearchResponse, QueueEntry,
    QueueResponse, VideoSearchResponse,
};

/// JSON-over-HTTP client for the media backend.
///
/// Every request inherits the client-wide timeout.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let resp = req.send().await.map_err(|e| self.classify(e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "backend API error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let resp = self.send(req).await?;
        resp.json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn classify(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }
        } else {
            BackendError::Http(e)
        }
    }
}

#[async_trait]
impl MediaBackend for HttpBackend {
    async fn import(&self, req: &ImportRequest) -> Result<(), BackendError> {
        debug!(id = %req.id, file = %req.file, "importing media file");
        self.send(self.client.post(self.url("/library/import")).json(req))
            .await?;
        Ok(())
    }

    async fn set_label(&self, code: &str, label: &str) -> Result<(), BackendError> {
        self.send(
            self.client
                .post(self.url("/library/label"))
                .query(&[("code", code), ("label", label)]),
        )
        .await?;
        Ok(())
    }

    async fn search_library(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LibraryItem>, BackendError> {
        let resp: LibrarySearchResponse = self
            .send_json(
                self.client
                    .post(self.url("/library/search"))
                    .json(&json!({ "query": query, "limit": limit })),
            )
            .await?;
        Ok(resp.results)
    }

    async fn enqueue(
        &self,
        query: &str,
        requested_by: &str,
    ) -> Result<EnqueueResponse, BackendError> {
        self.send_json(
            self.client
                .post(self.url("/queue"))
                .json(&json!({ "query": query, "requested_by": requested_by })),
        )
        .await
    }

    async fn enqueue_by_id(&self, db_id: i64) -> Result<(), BackendError> {
        self.send(
            self.client
                .post(self.url("/queue/by-id"))
                .json(&json!({ "db_id": db_id })),
        )
        .await?;
        Ok(())
    }

    async fn search_videos(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, BackendError> {
        let resp: VideoSearchResponse = self
            .send_json(
                self.client
                    .post(self.url("/yt/search"))
                    .json(&json!({ "query": query, "limit": limit })),
            )
            .await?;
        if !resp.ok {
            return Err(BackendError::Rejected(
                resp.error.unwrap_or_else(|| "search failed".to_string()),
            ));
        }
        Ok(resp.results)
    }

    async fn play_video(&self, video_id: &str) -> Result<(), BackendError> {
        self.send(
            self.client
                .post(self.url("/yt/play"))
                .json(&json!({ "video_id": video_id })),
        )
        .await?;
        Ok(())
    }

    async fn toggle_playback(&self) -> Result<(), BackendError> {
        self.send(self.client.post(self.url("/play"))).await?;
        Ok(())
    }

    async fn next(&self) -> Result<(), BackendError> {
        self.send(self.client.post(self.url("/next"))).await?;
        Ok(())
    }

    async fn set_volume(&self, value: u8) -> Result<(), BackendError> {
        self.send(
            self.client
                .post(self.url("/volume"))
                .query(&[("value", value)]),
        )
        .await?;
        Ok(())
    }

    async fn queue(&self) -> Result<Vec<QueueEntry>, BackendError> {
        let resp: QueueResponse = self.send_json(self.client.get(self.url("/queue"))).await?;
        Ok(resp.playlist)
    }

    async fn clear_queue(&self) -> Result<(), BackendError> {
        self.send(self.client.post(self.url("/queue/clear"))).await?;
        Ok(())
    }
}
