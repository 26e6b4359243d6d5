//! Recording listeners for asserting on deliveries.
//!
//! All recorders use `std::sync::Mutex` for sync/async compatibility and
//! are cheap to clone; clones share one log.

use std::sync::{Arc, Mutex};

use buzz_events::{Event, EventBus, Listener, ListenerError, Payload, Subscription};

/// Records every payload delivered to its listener.
#[derive(Debug)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
    failure: Option<String>,
}

impl<T: Payload + Clone> Recorder<T> {
    /// Create a recorder whose listener always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Create a recorder whose listener records the payload and then fails
    /// with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            failure: Some(message.into()),
        }
    }

    /// A new listener writing to this recorder.
    ///
    /// Each call returns a distinct listener; clone the result to register
    /// the same listener more than once.
    #[must_use]
    pub fn listener(&self) -> Listener<T> {
        let values = Arc::clone(&self.values);
        let failure = self.failure.clone();
        Listener::new(move |payload: &T| {
            if let Ok(mut guard) = values.lock() {
                guard.push(payload.clone());
            }
            match &failure {
                Some(message) => Err(message.clone()),
                None => Ok(()),
            }
        })
    }

    /// Payloads recorded so far, in delivery order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of deliveries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Forget recorded payloads.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.values.lock() {
            guard.clear();
        }
    }
}

impl<T: Payload + Clone> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            failure: self.failure.clone(),
        }
    }
}

/// A captured listener failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    /// Event whose delivery failed.
    pub event: String,
    /// Stable kind label, e.g. `listener_failed`.
    pub kind: &'static str,
    /// Rendered error message.
    pub message: String,
}

/// Captures failures reported to error listeners.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    errors: Arc<Mutex<Vec<ReportedError>>>,
}

impl ErrorLog {
    /// Create an empty log that is not attached to any bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log and register it as an error listener on `bus`.
    #[must_use]
    pub fn attach(bus: &EventBus) -> Self {
        let log = Self::new();
        log.subscribe(bus);
        log
    }

    /// Register this log as an error listener on `bus`.
    pub fn subscribe(&self, bus: &EventBus) -> Subscription {
        let errors = Arc::clone(&self.errors);
        bus.on_error(move |error: &ListenerError| {
            if let Ok(mut guard) = errors.lock() {
                guard.push(ReportedError {
                    event: error.event().to_owned(),
                    kind: error.as_label(),
                    message: error.to_string(),
                });
            }
        })
    }

    /// All captured failures, in report order.
    #[must_use]
    pub fn errors(&self) -> Vec<ReportedError> {
        self.errors.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Kind labels of the captured failures.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.errors
            .lock()
            .map(|g| g.iter().map(|e| e.kind).collect())
            .unwrap_or_default()
    }

    /// Number of captured failures.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Shared ordered log of labels, for asserting call order across listeners.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty call log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label`.
    pub fn push(&self, label: impl Into<String>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(label.into());
        }
    }

    /// A listener that appends `label` on every delivery.
    #[must_use]
    pub fn listener<T: Payload>(&self, label: impl Into<String>) -> Listener<T> {
        let log = self.clone();
        let label = label.into();
        Listener::new(move |_: &T| log.push(label.clone()))
    }

    /// A wildcard callback that appends `label:<event name>`.
    pub fn wildcard(&self, label: impl Into<String>) -> impl Fn(&Event<'_>) + Send + Sync + 'static {
        let log = self.clone();
        let label = label.into();
        move |event: &Event<'_>| log.push(format!("{label}:{}", event.name()))
    }

    /// Labels appended so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Forget all entries.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }
}
