//! Borrowed view of an event being delivered.

use std::any::{Any, type_name};
use std::fmt;

use crate::payload::Payload;

/// An event as seen by wildcard listeners: its name plus the type-erased
/// payload.
///
/// Use [`Event::payload`] to recover a concrete payload type.
#[derive(Clone, Copy)]
pub struct Event<'a> {
    name: &'a str,
    payload: &'a (dyn Any + Send + Sync),
    type_name: &'static str,
    absent: bool,
}

impl<'a> Event<'a> {
    /// Borrow a typed payload as an event.
    pub(crate) fn new<T: Payload>(name: &'a str, payload: &'a T) -> Self {
        Self {
            name,
            absent: payload.is_absent(),
            payload,
            type_name: type_name::<T>(),
        }
    }

    /// Rebuild an event from an erased payload.
    pub(crate) fn from_parts(
        name: &'a str,
        payload: &'a (dyn Any + Send + Sync),
        type_name: &'static str,
        absent: bool,
    ) -> Self {
        Self {
            name,
            payload,
            type_name,
            absent,
        }
    }

    /// Event name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The payload, if it is a `T`.
    #[must_use]
    pub fn payload<T: Any>(&self) -> Option<&'a T> {
        self.payload.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// Type name of the payload as emitted.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the payload stands for "no payload" (see
    /// [`Payload::is_absent`]).
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.absent
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("absent", &self.absent)
            .finish_non_exhaustive()
    }
}
