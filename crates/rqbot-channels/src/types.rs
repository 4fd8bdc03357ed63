use serde::{Deserialize, Serialize};

/// Conversation ids of WhatsApp groups end with this suffix.
pub const GROUP_SUFFIX: &str = "@g.us";

/// Returns `true` when `conversation_id` names a group chat.
pub fn is_group_conversation(conversation_id: &str) -> bool {
    conversation_id.ends_with(GROUP_SUFFIX)
}

/// A single inbound chat event, immutable once received.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    /// Platform message id, used to target reactions.
    pub id: String,

    /// Opaque identifier of the chat thread (direct or group).
    pub conversation_id: String,

    /// Platform-native identifier of the participant who sent the message.
    pub sender_id: String,

    /// Set when the bot's own account authored the message.
    pub from_me: bool,

    /// Plain text body, or the caption of a media message.
    pub text: String,

    pub is_group: bool,

    /// Participant ids addressed with `@` in this message.
    pub mentions: Vec<String>,

    pub attachment: Option<Attachment>,
}

impl ChatEvent {
    /// Build a text event. The group flag is derived from the conversation id.
    pub fn new(
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let conversation_id = conversation_id.into();
        Self {
            id: String::new(),
            is_group: is_group_conversation(&conversation_id),
            conversation_id,
            sender_id: sender_id.into(),
            from_me: false,
            text: text.into(),
            mentions: Vec::new(),
            attachment: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_mentions<I, S>(mut self, mentions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions = mentions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn from_me(mut self, from_me: bool) -> Self {
        self.from_me = from_me;
        self
    }

    /// Whether `participant` appears in this event's mention list.
    pub fn mentions(&self, participant: &str) -> bool {
        self.mentions.iter().any(|m| m == participant)
    }
}

/// Binary payload carried by a media message.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Raw MIME type as reported by the platform, parameters included
    /// (e.g. `audio/ogg; codecs=opus`).
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Lowercased MIME type without parameters: `audio/ogg; codecs=opus` → `audio/ogg`.
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

/// Chat presence shown to the other participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// "typing…"
    Composing,
    /// Clears the typing indicator.
    Paused,
}
