//! Listener registry: priority-ordered named sequences, wildcards and error
//! listeners.
//!
//! The registry itself is plain data. [`crate::EventBus`] owns it behind a
//! single `RwLock` and only ever hands clones of the stored callbacks to
//! dispatch, so no lock is held while a listener runs.

use std::collections::HashMap;

use crate::listener::{ErrorHandler, Handler, ListenerKey};
use crate::subscription::{Scope, SubscriptionId};

/// A named or wildcard registration.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) id: SubscriptionId,
    /// Listener identity for `off`. `None` for wildcard registrations.
    pub(crate) origin: Option<ListenerKey>,
    pub(crate) priority: i32,
    pub(crate) handler: Handler,
}

/// An error-listener registration.
#[derive(Clone)]
pub(crate) struct ErrorEntry {
    pub(crate) id: SubscriptionId,
    pub(crate) handler: ErrorHandler,
}

#[derive(Default)]
pub(crate) struct Registry {
    named: HashMap<String, Vec<Entry>>,
    wildcard: Vec<Entry>,
    errors: Vec<ErrorEntry>,
}

impl Registry {
    /// Insert after every entry whose priority is lower than or equal to the
    /// new one. Returns the position taken.
    pub(crate) fn insert(&mut self, event: &str, entry: Entry) -> usize {
        let sequence = self.named.entry(event.to_owned()).or_default();
        let at = sequence.partition_point(|e| e.priority <= entry.priority);
        sequence.insert(at, entry);
        at
    }

    pub(crate) fn push_wildcard(&mut self, entry: Entry) {
        self.wildcard.push(entry);
    }

    pub(crate) fn push_error(&mut self, entry: ErrorEntry) {
        self.errors.push(entry);
    }

    /// Remove the entry registered under `id`. Returns `true` if it was found.
    pub(crate) fn remove(&mut self, scope: &Scope, id: SubscriptionId) -> bool {
        match scope {
            Scope::Named(event) => {
                let Some(sequence) = self.named.get_mut(event) else {
                    return false;
                };
                let before = sequence.len();
                sequence.retain(|e| e.id != id);
                let removed = sequence.len() != before;
                if sequence.is_empty() {
                    self.named.remove(event);
                }
                removed
            },
            Scope::Wildcard => {
                let before = self.wildcard.len();
                self.wildcard.retain(|e| e.id != id);
                self.wildcard.len() != before
            },
            Scope::Error => {
                let before = self.errors.len();
                self.errors.retain(|e| e.id != id);
                self.errors.len() != before
            },
        }
    }

    /// Whether the entry registered under `id` is still present.
    pub(crate) fn contains(&self, scope: &Scope, id: SubscriptionId) -> bool {
        match scope {
            Scope::Named(event) => self
                .named
                .get(event)
                .is_some_and(|sequence| sequence.iter().any(|e| e.id == id)),
            Scope::Wildcard => self.wildcard.iter().any(|e| e.id == id),
            Scope::Error => self.errors.iter().any(|e| e.id == id),
        }
    }

    /// Remove every entry of `event` registered with listener `key`.
    /// Returns how many were removed.
    pub(crate) fn remove_listener(&mut self, event: &str, key: ListenerKey) -> usize {
        let Some(sequence) = self.named.get_mut(event) else {
            return 0;
        };
        let before = sequence.len();
        sequence.retain(|e| e.origin != Some(key));
        let removed = before.saturating_sub(sequence.len());
        if sequence.is_empty() {
            self.named.remove(event);
        }
        removed
    }

    /// Drop the whole sequence of `event`. Returns how many entries it held.
    pub(crate) fn remove_event(&mut self, event: &str) -> usize {
        self.named.remove(event).map_or(0, |sequence| sequence.len())
    }

    /// Drop every named sequence and every wildcard entry.
    pub(crate) fn clear_listeners(&mut self) {
        self.named.clear();
        self.wildcard.clear();
    }

    /// Drop every error listener.
    pub(crate) fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub(crate) fn snapshot(&self, event: &str) -> Vec<Handler> {
        self.named
            .get(event)
            .map(|sequence| sequence.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn snapshot_wildcard(&self) -> Vec<Handler> {
        self.wildcard.iter().map(|e| e.handler.clone()).collect()
    }

    pub(crate) fn snapshot_errors(&self) -> Vec<ErrorHandler> {
        self.errors.iter().map(|e| e.handler.clone()).collect()
    }

    pub(crate) fn named_len(&self, event: &str) -> usize {
        self.named.get(event).map_or(0, Vec::len)
    }

    pub(crate) fn wildcard_len(&self) -> usize {
        self.wildcard.len()
    }

    pub(crate) fn error_len(&self) -> usize {
        self.errors.len()
    }

    /// Names with at least one registration, sorted.
    pub(crate) fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.named.keys().cloned().collect();
        names.sort();
        names
    }

    /// Priorities of `event`'s sequence, in dispatch order.
    #[cfg(test)]
    pub(crate) fn priorities(&self, event: &str) -> Vec<i32> {
        self.named
            .get(event)
            .map(|sequence| sequence.iter().map(|e| e.priority).collect())
            .unwrap_or_default()
    }
}
