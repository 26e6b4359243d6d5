//! Listener handles and the type-erased callbacks stored in the registry.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, ListenerError};
use crate::event::Event;
use crate::payload::Payload;

/// Return types accepted from listener callbacks.
///
/// Implemented for `()` (a listener that cannot fail) and for
/// `Result<(), E>` where `E` converts into a boxed error.
pub trait ListenerOutput {
    /// Convert into the bus's uniform outcome.
    ///
    /// # Errors
    ///
    /// Returns the listener's error, boxed.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl ListenerOutput for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> ListenerOutput for Result<(), E> {
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

type Callback<T> = dyn Fn(&T) -> Result<(), BoxError> + Send + Sync;

/// A callback for events carrying a `T` payload.
///
/// Cloning a `Listener` yields the *same* listener: [`EventBus::off`]
/// removes every registration made with any clone of it. Two listeners built
/// from separate calls to [`Listener::new`] are always distinct, even when
/// built from the same closure.
///
/// [`EventBus::off`]: crate::EventBus::off
pub struct Listener<T> {
    callback: Arc<Callback<T>>,
}

impl<T: Payload> Listener<T> {
    /// Wrap a closure.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: ListenerOutput,
    {
        Self {
            callback: Arc::new(move |payload: &T| f(payload).into_outcome()),
        }
    }

    /// Invoke the listener directly, bypassing the bus.
    ///
    /// # Errors
    ///
    /// Returns whatever error the wrapped closure returned.
    pub fn call(&self, payload: &T) -> Result<(), BoxError> {
        (self.callback)(payload)
    }

    /// Whether `self` and `other` are the same listener.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    pub(crate) fn key(&self) -> ListenerKey {
        ListenerKey(Arc::as_ptr(&self.callback).cast::<()>() as usize)
    }

    /// Erase the payload type for storage in the registry.
    pub(crate) fn into_handler(self) -> Handler {
        Arc::new(move |event: &Event<'_>| match event.payload::<T>() {
            Some(payload) => self.call(payload).map_err(Fault::Failed),
            None => Err(Fault::Mismatch {
                expected: type_name::<T>(),
                actual: event.type_name(),
            }),
        })
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("payload", &type_name::<T>())
            .field("callback", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Identity of a [`Listener`], compared by `off`.
///
/// Only meaningful while the registry holds a clone of the listener, which
/// keeps the address from being reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListenerKey(usize);

/// Why a stored callback did not complete.
pub(crate) enum Fault {
    Failed(BoxError),
    Panicked(String),
    Mismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl Fault {
    pub(crate) fn into_error(self, event: &str) -> ListenerError {
        let event = event.to_owned();
        match self {
            Self::Failed(source) => ListenerError::Failed { event, source },
            Self::Panicked(message) => ListenerError::Panicked { event, message },
            Self::Mismatch { expected, actual } => ListenerError::PayloadMismatch {
                event,
                expected,
                actual,
            },
        }
    }
}

/// Type-erased event callback, shared by named and wildcard registrations.
pub(crate) type Handler = Arc<dyn Fn(&Event<'_>) -> Result<(), Fault> + Send + Sync>;

/// Error listener callback.
pub(crate) type ErrorHandler = Arc<dyn Fn(&ListenerError) -> Result<(), BoxError> + Send + Sync>;

/// Erase a wildcard closure.
pub(crate) fn wildcard_handler<F, R>(f: F) -> Handler
where
    F: Fn(&Event<'_>) -> R + Send + Sync + 'static,
    R: ListenerOutput,
{
    Arc::new(move |event: &Event<'_>| f(event).into_outcome().map_err(Fault::Failed))
}

/// Erase an error-listener closure.
pub(crate) fn error_handler<F, R>(f: F) -> ErrorHandler
where
    F: Fn(&ListenerError) -> R + Send + Sync + 'static,
    R: ListenerOutput,
{
    Arc::new(move |error: &ListenerError| f(error).into_outcome())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_same_listener() {
        let listener = Listener::new(|_: &u32| {});
        let clone = listener.clone();

        assert!(listener.same(&clone));
        assert_eq!(listener.key(), clone.key());
    }

    #[test]
    fn test_separate_listeners_differ() {
        let a = Listener::new(|_: &u32| {});
        let b = Listener::new(|_: &u32| {});

        assert!(!a.same(&b));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_result_outputs() {
        let ok = Listener::new(|_: &u32| Ok::<(), String>(()));
        let failing = Listener::new(|n: &u32| {
            if *n > 1 {
                Err(format!("{n} is too large"))
            } else {
                Ok(())
            }
        });

        assert!(ok.call(&5).is_ok());
        assert!(failing.call(&1).is_ok());
        assert_eq!(failing.call(&2).unwrap_err().to_string(), "2 is too large");
    }

    #[test]
    fn test_handler_reports_type_mismatch() {
        let handler = Listener::new(|_: &u32| {}).into_handler();
        let payload = String::from("not a number");
        let event = Event::new("count", &payload);

        let fault = handler(&event).err().unwrap();
        let error = fault.into_error(event.name());
        assert!(matches!(
            error,
            ListenerError::PayloadMismatch { expected: "u32", .. }
        ));
    }
}
