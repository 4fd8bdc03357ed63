//! Event ingress — POST /events.
//!
//! The chat bridge posts every inbound message here as JSON. Attachment
//! bytes travel base64-encoded. Events are queued per conversation and
//! routed by a background worker; the caller only gets a receipt.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rqbot_channels::{Attachment, ChatEvent};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;

/// Wire form of an inbound chat event.
#[derive(Debug, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub attachment: Option<InboundAttachment>,
}

#[derive(Debug, Deserialize)]
pub struct InboundAttachment {
    pub mime_type: String,
    /// Base64 (standard alphabet) payload.
    pub data: String,
}

impl InboundEvent {
    pub fn into_event(self) -> Result<ChatEvent, base64::DecodeError> {
        let mut event = ChatEvent::new(self.conversation_id, self.sender_id, self.text)
            .with_id(self.id)
            .with_mentions(self.mentions)
            .from_me(self.from_me);

        if let Some(a) = self.attachment {
            let data = STANDARD.decode(a.data.trim())?;
            event = event.with_attachment(Attachment::new(a.mime_type, data));
        }
        Ok(event)
    }
}

/// POST /events
///
/// Returns 202 + receipt ID once the event is queued, 401 on auth failure,
/// 400 on a malformed body.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Some(expected) = state.ingress_token.as_deref() {
        verify_bearer_token(&headers, expected).map_err(|e| auth_error(&e))?;
    }

    let inbound: InboundEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "invalid JSON in event body");
        bad_request("invalid JSON body")
    })?;

    let event = inbound.into_event().map_err(|e| {
        warn!(error = %e, "attachment is not valid base64");
        bad_request("attachment data is not valid base64")
    })?;

    let receipt_id = uuid::Uuid::new_v4().to_string();
    info!(
        receipt_id = %receipt_id,
        conversation = %event.conversation_id,
        group = event.is_group,
        attachment = event.attachment.is_some(),
        "event accepted"
    );

    state.router.submit(event);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"ok": true, "receipt_id": receipt_id})),
    ))
}

/// Verify a static bearer token in the `Authorization: Bearer <token>` header.
fn verify_bearer_token(headers: &HeaderMap, expected: &str) -> Result<(), String> {
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing Authorization header".to_string())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header must use Bearer scheme".to_string())?;

    if token == expected {
        Ok(())
    } else {
        Err("bearer token mismatch".to_string())
    }
}

fn auth_error(reason: &str) -> (StatusCode, Json<Value>) {
    warn!(reason = %reason, "event ingress authentication failed");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "authentication failed", "reason": reason})),
    )
}

fn bad_request(reason: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": reason})))
}
