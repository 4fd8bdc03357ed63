use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /library/import`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportRequest {
    pub id: String,
    /// Path of the stored file as seen by the backend.
    pub file: String,
    pub label: Option<String>,
}

/// One entry of the local media catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryItem {
    pub db_id: i64,
    #[serde(default)]
    pub title: String,
}

/// One remote search result offered for selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    #[serde(rename = "video_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Channel or author.
    #[serde(rename = "channel", default)]
    pub subtitle: String,
    /// Display label such as `3:45`; empty when the backend omits it.
    #[serde(default, deserialize_with = "duration_label")]
    pub duration: String,
}

/// Response of `POST /queue`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnqueueResponse {
    pub ok: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One playlist entry of `GET /queue`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    pub index: usize,
    pub filename: String,
    #[serde(default)]
    pub current: bool,
}

// Wire envelopes (private to the HTTP client).

#[derive(Deserialize)]
pub(crate) struct LibrarySearchResponse {
    #[serde(default)]
    pub results: Vec<LibraryItem>,
}

#[derive(Deserialize)]
pub(crate) struct VideoSearchResponse {
    #[serde(default = "ok_default")]
    pub ok: bool,
    #[serde(default)]
    pub results: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct QueueResponse {
    #[serde(default)]
    pub playlist: Vec<QueueEntry>,
}

fn ok_default() -> bool {
    true
}

/// Accept `"3:45"`, `225` (seconds) or `null`.
fn duration_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .map(|secs| format_seconds(secs.max(0.0) as u64))
            .unwrap_or_default(),
        _ => String::new(),
    })
}

fn format_seconds(total: u64) -> String {
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
