//! Process-wide bus for composition roots.
//!
//! Library code should take an [`EventBus`] explicitly. This module exists
//! for binaries that want one bus reachable from anywhere; install it once
//! at startup, before anything calls [`bus`].

use std::sync::OnceLock;

use crate::bus::EventBus;

static GLOBAL: OnceLock<EventBus> = OnceLock::new();

/// Install `bus` as the process-wide bus.
///
/// # Errors
///
/// Returns `bus` back if a global bus is already set, either by an earlier
/// `install` or by a call to [`bus`].
pub fn install(bus: EventBus) -> Result<(), EventBus> {
    GLOBAL.set(bus)
}

/// The process-wide bus, created with default settings on first use if
/// nothing was installed.
#[must_use]
pub fn bus() -> &'static EventBus {
    GLOBAL.get_or_init(EventBus::new)
}
