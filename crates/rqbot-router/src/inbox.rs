use std::collections::VecDeque;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Per-conversation FIFO of events waiting to be routed.
///
/// A conversation has an entry exactly while one worker is draining it.
/// Pushes and pops for the same conversation go through the same shard
/// lock, so the worker that sees an empty queue removes the entry before
/// any later push can observe it.
pub struct Inbox<T> {
    queues: DashMap<String, VecDeque<T>>,
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self {
            queues: DashMap::new(),
        }
    }
}

impl<T> Inbox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` behind earlier items of the conversation.
    ///
    /// Returns `true` when nobody is draining the conversation; the caller
    /// must then start a worker that calls [`Inbox::pop`] until `None`.
    pub fn push(&self, conversation_id: &str, item: T) -> bool {
        match self.queues.entry(conversation_id.to_string()) {
            Entry::Occupied(mut e) => {
                e.get_mut().push_back(item);
                false
            }
            Entry::Vacant(e) => {
                e.insert(VecDeque::from([item]));
                true
            }
        }
    }

    /// Next item for the conversation's worker. `None` means the queue ran
    /// dry and the conversation has been forgotten; the worker must stop.
    pub fn pop(&self, conversation_id: &str) -> Option<T> {
        match self.queues.entry(conversation_id.to_string()) {
            Entry::Occupied(mut e) => {
                let next = e.get_mut().pop_front();
                if next.is_none() {
                    e.remove();
                }
                next
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Number of conversations with a worker running.
    pub fn active(&self) -> usize {
        self.queues.len()
    }
}
