//! Import of audio files sent as attachments.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rqbot_backend::{ImportRequest, MediaBackend};
use rqbot_channels::Attachment;
use tracing::{info, warn};

use crate::error::MediaError;
use crate::replies;

/// Accepted MIME essences and the file extension each is stored under.
const AUDIO_TYPES: &[(&str, &str)] = &[
    ("audio/mpeg", "mp3"),
    ("audio/mp3", "mp3"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/wave", "wav"),
    ("audio/flac", "flac"),
    ("audio/x-flac", "flac"),
    ("audio/aac", "aac"),
    ("audio/ogg", "ogg"),
    ("audio/oga", "oga"),
    ("audio/opus", "opus"),
    ("audio/mp4", "m4a"),
    ("audio/m4a", "m4a"),
    ("audio/x-m4a", "m4a"),
];

/// Extension for an accepted MIME essence, `None` when the type is refused.
pub fn extension_for(essence: &str) -> Option<&'static str> {
    AUDIO_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Short catalog id: `A` plus the last six digits of the millisecond clock.
pub fn generate_id(unix_millis: i64) -> String {
    format!("A{:06}", unix_millis.rem_euclid(1_000_000))
}

/// Where imported bytes end up before the backend is told about them.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `data` as `file_name` and return the path to hand the backend.
    async fn save(&self, file_name: &str, data: &[u8]) -> std::io::Result<String>;
}

/// Stores files in a local directory, created on first use.
pub struct FsMediaStore {
    dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, file_name: &str, data: &[u8]) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}

pub struct MediaImport {
    store: Arc<dyn MediaStore>,
    backend: Arc<dyn MediaBackend>,
}

impl MediaImport {
    pub fn new(store: Arc<dyn MediaStore>, backend: Arc<dyn MediaBackend>) -> Self {
        Self { store, backend }
    }

    /// Validate, store and register `attachment`; returns the reply text.
    pub async fn import(&self, conversation_id: &str, attachment: &Attachment) -> String {
        let essence = attachment.essence();
        let Some(ext) = extension_for(&essence) else {
            info!(conversation = %conversation_id, mime = %essence, "attachment type refused");
            return replies::UNSUPPORTED_MEDIA.to_string();
        };

        let id = generate_id(Utc::now().timestamp_millis());
        match self.store_and_register(&id, ext, &attachment.data).await {
            Ok(file) => {
                info!(conversation = %conversation_id, id = %id, file = %file, "media imported");
                replies::media_imported(&id, ext)
            }
            Err(e) => {
                warn!(conversation = %conversation_id, id = %id, error = %e, "media import failed");
                replies::MEDIA_FAILURE.to_string()
            }
        }
    }

    async fn store_and_register(&self, id: &str, ext: &str, data: &[u8]) -> Result<String, MediaError> {
        let file = self.store.save(&format!("{id}.{ext}"), data).await?;
        self.backend
            .import(&ImportRequest {
                id: id.to_string(),
                file: file.clone(),
                label: None,
            })
            .await?;
        Ok(file)
    }
}
