//! Per-conversation search results awaiting a numeric choice.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rqbot_backend::Candidate;

/// Candidates offered to one conversation, replaced wholesale by a new search.
#[derive(Debug, Clone)]
pub struct PendingSelection {
    pub candidates: Vec<Candidate>,
    pub created_at: DateTime<Utc>,
}

/// Text that answers a pending selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionInput {
    /// 1-based position as typed; may be out of range or negative.
    Index(i64),
    Cancel,
}

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

impl SelectionInput {
    /// Recognise a bare integer or a cancel word. Anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("cancel") || text.eq_ignore_ascii_case("cancelar") {
            return Some(SelectionInput::Cancel);
        }
        if INTEGER.is_match(text) {
            // Overflowing input is out of range either way.
            return Some(SelectionInput::Index(text.parse().unwrap_or(0)));
        }
        None
    }
}

/// Outcome of answering a pending selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Valid choice; the entry is gone.
    Selected(Candidate),
    /// Entry removed without a backend call.
    Cancelled,
    /// Out of range; the entry is kept so the user can retry.
    InvalidIndex { max: usize },
}

/// Keyed store of pending selections, at most one per conversation.
#[derive(Default)]
pub struct PendingSelectionStore {
    entries: DashMap<String, PendingSelection>,
}

impl PendingSelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `candidates` for `conversation_id`, replacing any previous entry.
    pub fn put(&self, conversation_id: &str, candidates: Vec<Candidate>) {
        self.entries.insert(
            conversation_id.to_string(),
            PendingSelection {
                candidates,
                created_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, conversation_id: &str) -> Option<Vec<Candidate>> {
        self.entries
            .get(conversation_id)
            .map(|e| e.candidates.clone())
    }

    /// Remove the entry; a no-op when there is none.
    pub fn consume(&self, conversation_id: &str) -> Option<PendingSelection> {
        self.entries.remove(conversation_id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `text` against the conversation's pending entry.
    ///
    /// Returns `None` when nothing is pending or the text is not a selection
    /// answer, so intent parsing can proceed. The check and the removal
    /// happen under the same shard lock.
    pub fn resolve(&self, conversation_id: &str, text: &str) -> Option<Resolution> {
        let input = SelectionInput::parse(text)?;
        let Entry::Occupied(entry) = self.entries.entry(conversation_id.to_string()) else {
            return None;
        };

        let max = entry.get().candidates.len();
        let resolution = match input {
            SelectionInput::Cancel => {
                entry.remove();
                Resolution::Cancelled
            }
            SelectionInput::Index(k) if k >= 1 && (k as u64) <= max as u64 => {
                let mut pending = entry.remove();
                Resolution::Selected(pending.candidates.swap_remove(k as usize - 1))
            }
            SelectionInput::Index(_) => Resolution::InvalidIndex { max },
        };
        Some(resolution)
    }
}
