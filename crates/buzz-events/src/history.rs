//! Per-event payload history used by `emit_with_history` and `replay`.
//!
//! History is append-only and unbounded. Callers that need bounded memory
//! evict with [`crate::EventBus::clear_history`].

use std::any::{Any, type_name};
use std::sync::Arc;

use dashmap::DashMap;

use crate::event::Event;
use crate::payload::Payload;

/// A recorded, type-erased payload.
#[derive(Clone)]
pub(crate) struct Recorded {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    absent: bool,
}

impl Recorded {
    pub(crate) fn new<T: Payload>(payload: T) -> Self {
        Self {
            absent: payload.is_absent(),
            value: Arc::new(payload),
            type_name: type_name::<T>(),
        }
    }

    /// View the payload as an event named `name`.
    pub(crate) fn as_event<'a>(&'a self, name: &'a str) -> Event<'a> {
        Event::from_parts(name, self.value.as_ref(), self.type_name, self.absent)
    }

    fn downcast<T: Payload>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

#[derive(Default)]
pub(crate) struct History {
    events: DashMap<String, Vec<Recorded>>,
}

impl History {
    pub(crate) fn append(&self, event: &str, recorded: Recorded) {
        self.events
            .entry(event.to_owned())
            .or_default()
            .push(recorded);
    }

    /// Copy of `event`'s history. The map guard is released before return,
    /// so callers may deliver the payloads without holding it.
    pub(crate) fn snapshot(&self, event: &str) -> Vec<Recorded> {
        self.events
            .get(event)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }

    /// Recorded payloads of `event` that are a `T`, in order.
    pub(crate) fn typed<T: Payload>(&self, event: &str) -> Vec<Arc<T>> {
        self.events
            .get(event)
            .map(|entries| entries.iter().filter_map(Recorded::downcast::<T>).collect())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, |entries| entries.len())
    }

    /// Forget `event`'s history. Returns how many payloads it held.
    pub(crate) fn clear(&self, event: &str) -> usize {
        self.events
            .remove(event)
            .map_or(0, |(_, entries)| entries.len())
    }

    pub(crate) fn clear_all(&self) {
        self.events.clear();
    }
}
