//! Buzz Test - Shared test utilities for the buzz event bus.
//!
//! This crate provides recording listeners, fixtures and log capture that
//! can be used across buzz crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! buzz-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust
//! use buzz_events::EventBus;
//! use buzz_test::{ErrorLog, Message, Recorder, sample_message};
//!
//! let bus = EventBus::new();
//! let errors = ErrorLog::attach(&bus);
//! let recorder = Recorder::<Message>::new();
//!
//! bus.on("chat", recorder.listener());
//! bus.emit("chat", sample_message()).unwrap();
//!
//! assert_eq!(recorder.values(), vec![sample_message()]);
//! assert!(errors.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod logging;
pub mod recorders;

pub use fixtures::*;
pub use logging::*;
pub use recorders::*;
