//! Prelude module - commonly used types for convenient import.
//!
//! Use `use buzz_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use buzz_events::prelude::*;
//!
//! let bus = EventBus::new();
//! let subscription = bus.on("ping", Listener::new(|n: &u32| println!("ping {n}")));
//!
//! bus.emit("ping", 1_u32).unwrap();
//! subscription.unsubscribe();
//! ```

// Bus
pub use crate::{BusConfig, EventBus, WeakEventBus};

// Listeners and payloads
pub use crate::{Event, Listener, ListenerOutput, Payload, Subscription, SubscriptionId};

// Errors
pub use crate::{BoxError, BusError, BusResult, ListenerError};
