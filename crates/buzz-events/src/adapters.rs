//! Listener adapters: one-shot, filtered, throttled, replaying and
//! timeout-bounded registrations.
//!
//! Every adapter wraps the caller's listener in a new [`Listener`] and
//! registers that. The returned [`Subscription`] removes the adapter; `off`
//! with the wrapped listener does not match it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::bus::EventBus;
use crate::error::{BoxError, BusError, BusResult};
use crate::listener::Listener;
use crate::payload::Payload;
use crate::subscription::{Scope, Subscription, SubscriptionId};

impl EventBus {
    /// Register `listener` for a single successful delivery at priority 0.
    pub fn once<T: Payload>(&self, event: &str, listener: Listener<T>) -> Subscription {
        self.once_with_priority(event, listener, 0)
    }

    /// Register `listener` for a single successful delivery.
    ///
    /// The registration removes itself after the listener returns `Ok`. A
    /// failing listener stays registered and sees the next emission too.
    /// Unsubscribing before the event fires prevents delivery.
    pub fn once_with_priority<T: Payload>(
        &self,
        event: &str,
        listener: Listener<T>,
        priority: i32,
    ) -> Subscription {
        let id = SubscriptionId::new();
        let own = self.subscription(id, Scope::Named(event.to_owned()));

        let claimed = AtomicBool::new(false);
        let adapter = Listener::new(move |payload: &T| -> Result<(), BoxError> {
            if !claim(&claimed) {
                return Ok(());
            }
            listener.call(payload).inspect_err(|_| release(&claimed))?;
            own.unsubscribe();
            Ok(())
        });
        self.insert(event, id, adapter.key(), priority, adapter.into_handler())
    }

    /// Register `listener` at priority 0, called only for payloads matching
    /// `predicate`.
    pub fn filter<T, P>(&self, event: &str, listener: Listener<T>, predicate: P) -> Subscription
    where
        T: Payload,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let adapter = Listener::new(move |payload: &T| -> Result<(), BoxError> {
            if predicate(payload) {
                listener.call(payload)
            } else {
                Ok(())
            }
        });
        self.on(event, adapter)
    }

    /// Register `listener` at priority 0, delivering at most once per
    /// `min_interval`.
    ///
    /// The first emission is always delivered. Later ones are dropped until
    /// `min_interval` has elapsed since the last delivery. A delivery whose
    /// listener fails does not count. Each call creates its own window.
    pub fn throttle<T: Payload>(
        &self,
        event: &str,
        listener: Listener<T>,
        min_interval: Duration,
    ) -> Subscription {
        let last_delivery: Mutex<Option<Instant>> = Mutex::new(None);

        let adapter = Listener::new(move |payload: &T| -> Result<(), BoxError> {
            let now = Instant::now();
            let previous = {
                let mut last = last_delivery
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if let Some(at) = *last
                    && now.saturating_duration_since(at) < min_interval
                {
                    trace!(elapsed = ?now.saturating_duration_since(at), "Throttled delivery dropped");
                    return Ok(());
                }
                last.replace(now)
            };

            listener.call(payload).inspect_err(|_| {
                *last_delivery
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = previous;
            })
        });
        self.on(event, adapter)
    }

    /// Deliver every recorded payload of `event` to `listener`, oldest
    /// first, then register it at priority 0 for live emissions.
    ///
    /// Replayed deliveries go through the same failure handling as `emit`.
    /// History itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ErrorHandler`] if an error listener fails during
    /// replay. The listener is not registered in that case.
    pub fn replay<T: Payload>(&self, event: &str, listener: Listener<T>) -> BusResult<Subscription> {
        let _recording = self.shared().recording();
        let recorded = self.history_store().snapshot(event);
        if !recorded.is_empty() {
            debug!(
                bus = %self.config().name,
                event = %event,
                count = recorded.len(),
                "Replaying history"
            );
            let handler = listener.clone().into_handler();
            for payload in &recorded {
                self.safe_invoke(&handler, &payload.as_event(event))?;
            }
        }

        Ok(self.on(event, listener))
    }

    /// [`once`](Self::once), removed automatically if `event` has not been
    /// delivered within `timeout`.
    ///
    /// The timer runs as a task on the current tokio runtime and is
    /// cancelled as soon as the listener succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TimerUnavailable`] when called outside a tokio
    /// runtime. Nothing is registered in that case.
    pub fn once_with_timeout<T: Payload>(
        &self,
        event: &str,
        listener: Listener<T>,
        timeout: Duration,
    ) -> BusResult<Subscription> {
        let runtime = Handle::try_current().map_err(|_| BusError::TimerUnavailable)?;

        let token = CancellationToken::new();
        let id = SubscriptionId::new();
        let own = self.subscription(id, Scope::Named(event.to_owned()));

        let delivered = token.clone();
        let claimed = AtomicBool::new(false);
        let adapter = Listener::new(move |payload: &T| -> Result<(), BoxError> {
            if !claim(&claimed) {
                return Ok(());
            }
            listener.call(payload).inspect_err(|_| release(&claimed))?;
            delivered.cancel();
            own.unsubscribe();
            Ok(())
        });
        let subscription = self.insert(event, id, adapter.key(), 0, adapter.into_handler());

        let expiry = subscription.clone();
        let bus_name = self.config().name.clone();
        let event_name = event.to_owned();
        runtime.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    trace!(bus = %bus_name, event = %event_name, "Timeout cancelled");
                },
                () = tokio::time::sleep(timeout) => {
                    if expiry.is_active() {
                        debug!(
                            bus = %bus_name,
                            event = %event_name,
                            timeout_ms = timeout.as_millis(),
                            "One-shot listener timed out"
                        );
                    }
                    expiry.unsubscribe();
                },
            }
        });

        Ok(subscription)
    }
}

/// Take the single delivery slot of a one-shot adapter. Emissions racing
/// on other threads, or re-entering from the listener, see it taken.
fn claim(claimed: &AtomicBool) -> bool {
    claimed
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

/// Hand the slot back after a failed delivery.
fn release(claimed: &AtomicBool) {
    claimed.store(false, Ordering::Release);
}
