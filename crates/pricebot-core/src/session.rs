//! Per-chat conversation state for multi-step commands.

use std::collections::HashMap;
use std::sync::Mutex;

const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug)]
struct Entry<S> {
    state: S,
    touched: u64,
}

#[derive(Debug)]
struct Inner<S> {
    entries: HashMap<i64, Entry<S>>,
    clock: u64,
}

/// Conversation state keyed by chat id.
///
/// Handlers call [`SessionStateStore::clear`] when a flow reaches a terminal
/// action. Abandoned flows are bounded by `max_entries`: inserting past the
/// cap evicts the least recently touched chat.
#[derive(Debug)]
pub struct SessionStateStore<S> {
    inner: Mutex<Inner<S>>,
    max_entries: usize,
}

impl<S: Clone> SessionStateStore<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                clock: 0,
            }),
            max_entries: max_entries.max(1),
        }
    }

    /// Stores `state` for `chat_id`, replacing any previous state.
    pub fn set(&self, chat_id: i64, state: S) {
        let mut inner = self.lock();
        inner.clock += 1;
        let touched = inner.clock;

        if !inner.entries.contains_key(&chat_id) && inner.entries.len() >= self.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.touched)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                inner.entries.remove(&id);
                tracing::debug!(chat_id = id, "evicted stale session state");
            }
        }

        inner.entries.insert(chat_id, Entry { state, touched });
    }

    #[must_use]
    pub fn get(&self, chat_id: i64) -> Option<S> {
        let mut inner = self.lock();
        inner.clock += 1;
        let now = inner.clock;
        inner.entries.get_mut(&chat_id).map(|e| {
            e.touched = now;
            e.state.clone()
        })
    }

    /// Removes and returns the state for `chat_id`.
    pub fn clear(&self, chat_id: i64) -> Option<S> {
        self.lock().entries.remove(&chat_id).map(|e| e.state)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<S>> {
        // A poisoned lock only means another handler panicked mid-update; the
        // map itself is still consistent.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<S: Clone> Default for SessionStateStore<S> {
    fn default() -> Self {
        Self::new()
    }
}
