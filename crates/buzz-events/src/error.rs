//! Error types for the event bus.
//!
//! - [`ListenerError`]: a listener failed while an event was being delivered.
//!   These are recovered by the bus and handed to error listeners.
//! - [`BusError`]: a failure the bus cannot recover from, returned to the
//!   caller of `emit` and friends.

use thiserror::Error;

/// Boxed error type accepted from listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A listener failure caught during delivery.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("listener for `{event}` failed: {source}")]
    Failed {
        /// Event being delivered.
        event: String,
        /// Error returned by the listener.
        #[source]
        source: BoxError,
    },

    /// The listener panicked.
    #[error("listener for `{event}` panicked: {message}")]
    Panicked {
        /// Event being delivered.
        event: String,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The emitted payload is not the type the listener was registered for.
    #[error("listener for `{event}` expects `{expected}` but the payload is `{actual}`")]
    PayloadMismatch {
        /// Event being delivered.
        event: String,
        /// Payload type the listener declared.
        expected: &'static str,
        /// Payload type that was emitted.
        actual: &'static str,
    },
}

impl ListenerError {
    /// Name of the event whose delivery failed.
    #[must_use]
    pub fn event(&self) -> &str {
        match self {
            Self::Failed { event, .. }
            | Self::Panicked { event, .. }
            | Self::PayloadMismatch { event, .. } => event,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Failed { .. } => "listener_failed",
            Self::Panicked { .. } => "listener_panicked",
            Self::PayloadMismatch { .. } => "payload_mismatch",
        }
    }
}

/// Errors returned to callers of the bus.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    /// An error listener failed while handling a listener failure. Delivery
    /// of the current event stopped at that point.
    #[error("error listener failed while handling a failure on `{event}`: {source}")]
    ErrorHandler {
        /// Event whose delivery was being reported.
        event: String,
        /// Error returned by the error listener.
        #[source]
        source: BoxError,
    },

    /// A timed registration was requested outside a tokio runtime.
    #[error("timed registrations require a running tokio runtime")]
    TimerUnavailable,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::ErrorHandler { .. } => "error_handler_failed",
            Self::TimerUnavailable => "timer_unavailable",
        }
    }
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_error_display() {
        let err = ListenerError::Failed {
            event: "order.created".to_owned(),
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "listener for `order.created` failed: boom");
        assert_eq!(err.event(), "order.created");
        assert_eq!(err.as_label(), "listener_failed");
    }

    #[test]
    fn test_listener_error_source_chain() {
        use std::error::Error as _;

        let err = ListenerError::Failed {
            event: "x".to_owned(),
            source: "inner".into(),
        };
        assert_eq!(err.source().map(ToString::to_string), Some("inner".to_owned()));
    }

    #[test]
    fn test_mismatch_display() {
        let err = ListenerError::PayloadMismatch {
            event: "tick".to_owned(),
            expected: "u64",
            actual: "alloc::string::String",
        };
        assert!(err.to_string().contains("expects `u64`"));
        assert_eq!(err.as_label(), "payload_mismatch");
    }

    #[test]
    fn test_bus_error_labels() {
        assert_eq!(BusError::TimerUnavailable.as_label(), "timer_unavailable");
        let err = BusError::ErrorHandler {
            event: "x".to_owned(),
            source: "handler".into(),
        };
        assert_eq!(err.as_label(), "error_handler_failed");
    }
}
