//! Outbound transport over the chat bridge's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use rqbot_channels::{Presence, Transport, TransportError};
use serde_json::{json, Value};
use tracing::warn;

/// Delivers replies, presence updates and reactions by POSTing to the
/// bridge that owns the WhatsApp session.
pub struct HttpBridgeTransport {
    client: reqwest::Client,
    base_url: String,
    own_id: Option<String>,
    timeout: Duration,
}

impl HttpBridgeTransport {
    pub fn new(
        base_url: &str,
        own_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            own_id: own_id.filter(|id| !id.is_empty()),
            timeout,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<(), TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        ms: self.timeout.as_millis() as u64,
                    }
                } else if e.is_connect() {
                    TransportError::NotConnected
                } else {
                    TransportError::SendFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(path, status = status.as_u16(), body = %text, "bridge rejected request");
            return Err(TransportError::SendFailed(format!(
                "bridge returned {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpBridgeTransport {
    fn own_id(&self) -> Option<String> {
        self.own_id.clone()
    }

    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<(), TransportError> {
        self.post(
            "/send",
            json!({ "conversation_id": conversation_id, "text": text }),
        )
        .await
    }

    async fn send_presence(
        &self,
        conversation_id: &str,
        presence: Presence,
    ) -> Result<(), TransportError> {
        self.post(
            "/presence",
            json!({ "conversation_id": conversation_id, "presence": presence }),
        )
        .await
    }

    async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), TransportError> {
        self.post(
            "/react",
            json!({
                "conversation_id": conversation_id,
                "message_id": message_id,
                "emoji": emoji,
            }),
        )
        .await
    }
}
