//! Prelude module - commonly used test helpers for convenient import.
//!
//! Use `use buzz_test::prelude::*;` in test modules.

// Recorders
pub use crate::{CallLog, ErrorLog, Recorder};

// Fixtures
pub use crate::{Message, json_message, message, sample_message};

// Logging
pub use crate::init_test_logging;
