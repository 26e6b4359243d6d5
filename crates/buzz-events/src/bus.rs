//! The event bus: registration, dispatch and lifecycle.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, trace, warn};

use crate::config::BusConfig;
use crate::error::{BusError, BusResult, ListenerError};
use crate::event::Event;
use crate::history::{History, Recorded};
use crate::listener::{
    Fault, Handler, Listener, ListenerKey, ListenerOutput, error_handler, wildcard_handler,
};
use crate::payload::Payload;
use crate::registry::{Entry, ErrorEntry, Registry};
use crate::subscription::{Scope, Subscription, SubscriptionId};

/// State shared by every clone of an [`EventBus`].
pub(crate) struct Shared {
    registry: RwLock<Registry>,
    /// Serializes recording emissions against replays.
    recording: ReentrantMutex<()>,
    pub(crate) history: History,
    pub(crate) config: BusConfig,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn remove(&self, scope: &Scope, id: SubscriptionId) {
        let removed = self.write().remove(scope, id);
        if removed {
            debug!(bus = %self.config.name, subscription = %id, ?scope, "Listener unsubscribed");
        }
    }

    /// Held across dispatch plus append in `emit_with_history` and across
    /// snapshot plus registration in `replay`. Reentrant so listeners may
    /// record or replay on the same thread.
    pub(crate) fn recording(&self) -> ReentrantMutexGuard<'_, ()> {
        self.recording.lock()
    }

    pub(crate) fn contains(&self, scope: &Scope, id: SubscriptionId) -> bool {
        self.read().contains(scope, id)
    }
}

/// Process-local publish/subscribe bus.
///
/// Listeners run synchronously on the thread calling [`EventBus::emit`], in
/// ascending priority order, followed by wildcard listeners in registration
/// order. Every emission works on a snapshot of the registry, so listeners
/// may register, unsubscribe or emit from inside a callback; such changes
/// apply from the next emission on.
///
/// Cloning an `EventBus` is cheap and yields a handle to the same bus.
///
/// **WARNING:** a listener that captures a clone of its own bus creates an
/// `Arc` reference cycle and keeps the bus alive until the listener is
/// removed. Capture [`EventBus::downgrade`] instead.
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<Shared>,
}

/// Weak handle to an [`EventBus`].
#[derive(Clone)]
pub struct WeakEventBus {
    shared: std::sync::Weak<Shared>,
}

impl WeakEventBus {
    /// Get the bus back if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventBus> {
        self.shared.upgrade().map(|shared| EventBus { shared })
    }
}

impl fmt::Debug for WeakEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventBus").finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a bus with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with the given settings.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: RwLock::new(Registry::default()),
                recording: ReentrantMutex::new(()),
                history: History::default(),
                config,
            }),
        }
    }

    /// The settings this bus was built with.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.shared.config
    }

    /// Weak handle that does not keep the bus alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub(crate) fn subscription(&self, id: SubscriptionId, scope: Scope) -> Subscription {
        Subscription::new(id, scope, Arc::downgrade(&self.shared))
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    pub(crate) fn history_store(&self) -> &History {
        &self.shared.history
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register `listener` for `event` at priority 0.
    pub fn on<T: Payload>(&self, event: &str, listener: Listener<T>) -> Subscription {
        self.on_with_priority(event, listener, 0)
    }

    /// Register `listener` for `event`.
    ///
    /// Lower priorities fire first. The new entry goes after existing entries
    /// of equal priority. Registering the same listener twice creates two
    /// independent entries.
    pub fn on_with_priority<T: Payload>(
        &self,
        event: &str,
        listener: Listener<T>,
        priority: i32,
    ) -> Subscription {
        let origin = listener.key();
        self.insert(
            event,
            SubscriptionId::new(),
            origin,
            priority,
            listener.into_handler(),
        )
    }

    pub(crate) fn insert(
        &self,
        event: &str,
        id: SubscriptionId,
        origin: ListenerKey,
        priority: i32,
        handler: Handler,
    ) -> Subscription {
        let position = self.shared.write().insert(
            event,
            Entry {
                id,
                origin: Some(origin),
                priority,
                handler,
            },
        );

        debug!(
            bus = %self.name(),
            event = %event,
            priority,
            position,
            "Listener registered"
        );
        self.subscription(id, Scope::Named(event.to_owned()))
    }

    /// Register a listener for every event, regardless of name.
    pub fn on_any<F, R>(&self, listener: F) -> Subscription
    where
        F: Fn(&Event<'_>) -> R + Send + Sync + 'static,
        R: ListenerOutput,
    {
        let id = SubscriptionId::new();
        self.shared.write().push_wildcard(Entry {
            id,
            origin: None,
            priority: 0,
            handler: wildcard_handler(listener),
        });

        debug!(bus = %self.name(), "Wildcard listener registered");
        self.subscription(id, Scope::Wildcard)
    }

    /// Register a listener for failures of other listeners.
    ///
    /// Error listeners are not isolated: one returning `Err` aborts the
    /// current emission and the error surfaces as
    /// [`BusError::ErrorHandler`].
    pub fn on_error<F, R>(&self, listener: F) -> Subscription
    where
        F: Fn(&ListenerError) -> R + Send + Sync + 'static,
        R: ListenerOutput,
    {
        let id = SubscriptionId::new();
        self.shared.write().push_error(ErrorEntry {
            id,
            handler: error_handler(listener),
        });

        debug!(bus = %self.name(), "Error listener registered");
        self.subscription(id, Scope::Error)
    }

    /// Remove every registration of `listener` (or a clone of it) for
    /// `event`. Returns how many were removed.
    ///
    /// Listeners wrapped by `once`, `filter`, `throttle` or
    /// `once_with_timeout` are registered as distinct listeners and are not
    /// matched; use their [`Subscription`] instead.
    pub fn off<T: Payload>(&self, event: &str, listener: &Listener<T>) -> usize {
        let removed = self.shared.write().remove_listener(event, listener.key());
        if removed > 0 {
            debug!(bus = %self.name(), event = %event, removed, "Listener removed");
        }
        removed
    }

    /// With an event name, drop every listener of that event. Without one,
    /// drop every named and wildcard listener.
    ///
    /// Error listeners and history are kept.
    pub fn remove_all(&self, event: Option<&str>) {
        match event {
            Some(event) => {
                let removed = self.shared.write().remove_event(event);
                debug!(bus = %self.name(), event = %event, removed, "Event listeners cleared");
            },
            None => {
                self.shared.write().clear_listeners();
                debug!(bus = %self.name(), "All listeners cleared");
            },
        }
    }

    /// Drop every named, wildcard and error listener. History is kept; see
    /// [`EventBus::clear_history`].
    pub fn reset(&self) {
        {
            let mut registry = self.shared.write();
            registry.clear_listeners();
            registry.clear_errors();
        }
        debug!(bus = %self.name(), "Bus reset");
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Deliver `payload` to the listeners of `event`, then to every wildcard
    /// listener.
    ///
    /// Listener failures are reported to error listeners and do not stop
    /// delivery. Failures on absent payloads (see [`Payload::is_absent`])
    /// are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ErrorHandler`] if an error listener fails. The
    /// remaining listeners for this emission are skipped.
    pub fn emit<T: Payload>(&self, event: &str, payload: T) -> BusResult<()> {
        self.dispatch(&Event::new(event, &payload))
    }

    /// [`emit`](Self::emit), then append `payload` to the history of
    /// `event` for later [`replay`](Self::replay).
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ErrorHandler`] if an error listener fails; the
    /// payload is not recorded in that case.
    pub fn emit_with_history<T: Payload>(&self, event: &str, payload: T) -> BusResult<()> {
        let _recording = self.shared.recording();
        self.dispatch(&Event::new(event, &payload))?;
        self.shared.history.append(event, Recorded::new(payload));
        trace!(
            bus = %self.name(),
            event = %event,
            recorded = self.shared.history.len(event),
            "Payload recorded"
        );
        Ok(())
    }

    fn dispatch(&self, event: &Event<'_>) -> BusResult<()> {
        let named = self.shared.read().snapshot(event.name());

        trace!(
            bus = %self.name(),
            event = %event.name(),
            listener_count = named.len(),
            "Emitting event"
        );

        for handler in &named {
            self.safe_invoke(handler, event)?;
        }

        let wildcard = self.shared.read().snapshot_wildcard();
        for handler in &wildcard {
            self.safe_invoke(handler, event)?;
        }

        Ok(())
    }

    /// Run one listener, routing its failure to the error listeners.
    pub(crate) fn safe_invoke(&self, handler: &Handler, event: &Event<'_>) -> BusResult<()> {
        let Err(fault) = self.invoke(handler, event) else {
            return Ok(());
        };
        let error = fault.into_error(event.name());

        if event.is_absent() {
            trace!(
                bus = %self.name(),
                event = %event.name(),
                error = %error,
                "Dropping listener failure for absent payload"
            );
            return Ok(());
        }

        warn!(
            bus = %self.name(),
            event = %event.name(),
            kind = error.as_label(),
            error = %error,
            "Listener failed"
        );
        self.report(&error)
    }

    fn invoke(&self, handler: &Handler, event: &Event<'_>) -> Result<(), Fault> {
        if !self.shared.config.catch_panics {
            return handler(event);
        }

        match catch_unwind(AssertUnwindSafe(|| handler(event))) {
            Ok(outcome) => outcome,
            Err(panic) => Err(Fault::Panicked(panic_message(panic.as_ref()))),
        }
    }

    fn report(&self, error: &ListenerError) -> BusResult<()> {
        let handlers = self.shared.read().snapshot_errors();
        for handler in &handlers {
            handler(error).map_err(|source| BusError::ErrorHandler {
                event: error.event().to_owned(),
                source,
            })?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Listeners registered for `event` plus every wildcard listener.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        let registry = self.shared.read();
        registry
            .named_len(event)
            .saturating_add(registry.wildcard_len())
    }

    /// Whether an emission of `event` would reach any listener.
    #[must_use]
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Number of registered error listeners.
    #[must_use]
    pub fn error_listener_count(&self) -> usize {
        self.shared.read().error_len()
    }

    /// Names of events with at least one named listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.shared.read().event_names()
    }

    /// Recorded payloads of `event` that are a `T`, oldest first.
    #[must_use]
    pub fn history<T: Payload>(&self, event: &str) -> Vec<Arc<T>> {
        self.shared.history.typed::<T>(event)
    }

    /// Number of recorded payloads of `event`, of any type.
    #[must_use]
    pub fn history_len(&self, event: &str) -> usize {
        self.shared.history.len(event)
    }

    /// Forget the history of `event`, or of every event when `None`.
    ///
    /// This is the only operation that removes history; [`reset`](Self::reset)
    /// and [`remove_all`](Self::remove_all) leave it alone.
    pub fn clear_history(&self, event: Option<&str>) {
        match event {
            Some(event) => {
                let removed = self.shared.history.clear(event);
                debug!(bus = %self.name(), event = %event, removed, "History cleared");
            },
            None => {
                self.shared.history.clear_all();
                debug!(bus = %self.name(), "All history cleared");
            },
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.read();
        f.debug_struct("EventBus")
            .field("name", &self.shared.config.name)
            .field("events", &registry.event_names().len())
            .field("wildcard_listeners", &registry.wildcard_len())
            .field("error_listeners", &registry.error_len())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
