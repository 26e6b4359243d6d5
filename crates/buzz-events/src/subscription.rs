//! Unsubscribe capabilities returned by every registration.

use std::fmt;
use std::sync::Weak;

use uuid::Uuid;

use crate::bus::Shared;

/// Identifier of a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new subscription ID.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which sequence a registration lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scope {
    Named(String),
    Wildcard,
    Error,
}

/// Handle that removes exactly one registration.
///
/// [`Subscription::unsubscribe`] is idempotent. Dropping the handle does
/// **not** unsubscribe; the registration lives until it is removed
/// explicitly or by a bulk clear. The handle holds only a weak reference
/// to the bus.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    scope: Scope,
    bus: Weak<Shared>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, scope: Scope, bus: Weak<Shared>) -> Self {
        Self { id, scope, bus }
    }

    /// Remove the registration. Does nothing if it is already gone.
    pub fn unsubscribe(&self) {
        if let Some(shared) = self.bus.upgrade() {
            shared.remove(&self.scope, self.id);
        }
    }

    /// Whether the registration is still present on a live bus.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|shared| shared.contains(&self.scope, self.id))
    }

    /// Identifier of the registration.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Event name for named registrations; `None` for wildcard and error
    /// listeners.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        match &self.scope {
            Scope::Named(event) => Some(event),
            Scope::Wildcard | Scope::Error => None,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
