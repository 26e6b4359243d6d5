//! Buzz Events - typed, process-local publish/subscribe bus.
//!
//! This crate provides:
//! - Named events with arbitrary `'static` payloads
//! - Priority-ordered listeners, wildcard listeners and error listeners
//! - One-shot, filtered, throttled, replaying and timeout-bounded adapters
//! - Per-event history for late subscribers
//!
//! # Architecture
//!
//! Producers call [`EventBus::emit`] with an event name and a payload.
//! Listeners registered for that name run synchronously on the emitting
//! thread in ascending priority order, then every wildcard listener runs.
//!
//! A listener that returns `Err`, panics, or receives a payload of the wrong
//! type does not stop delivery: the failure is handed to every error
//! listener registered with [`EventBus::on_error`] as a [`ListenerError`].
//!
//! Every registration returns a [`Subscription`] that removes exactly that
//! registration.
//!
//! # Example
//!
//! ```rust
//! use buzz_events::{EventBus, Listener, ListenerError, Payload};
//!
//! #[derive(Debug)]
//! struct OrderPlaced {
//!     id: u64,
//! }
//!
//! impl Payload for OrderPlaced {}
//!
//! let bus = EventBus::new();
//!
//! bus.on_error(|error: &ListenerError| eprintln!("{error}"));
//!
//! let subscription = bus.on(
//!     "order.placed",
//!     Listener::new(|order: &OrderPlaced| println!("order {}", order.id)),
//! );
//!
//! bus.emit("order.placed", OrderPlaced { id: 7 }).unwrap();
//! assert_eq!(bus.listener_count("order.placed"), 1);
//!
//! subscription.unsubscribe();
//! assert_eq!(bus.listener_count("order.placed"), 0);
//! ```
//!
//! # Feature flags
//!
//! - `config`: build a [`BusConfig`] from the `[bus]` section of a
//!   `buzz-config` file.
//! - `global`: a process-wide bus in [`global`], for composition roots.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod adapters;
mod bus;
mod config;
mod error;
mod event;
#[cfg(feature = "global")]
pub mod global;
mod history;
mod listener;
mod payload;
mod registry;
mod subscription;

pub use bus::{EventBus, WeakEventBus};
pub use config::BusConfig;
pub use error::{BoxError, BusError, BusResult, ListenerError};
pub use event::Event;
pub use listener::{Listener, ListenerOutput};
pub use payload::Payload;
pub use subscription::{Subscription, SubscriptionId};
