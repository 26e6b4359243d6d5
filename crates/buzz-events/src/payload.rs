//! Payload marker trait.

use std::any::Any;
use std::sync::Arc;

/// A value that can be emitted on the bus.
///
/// Payloads are stored type-erased, so they must be `'static`, `Send` and
/// `Sync`. User types opt in with an empty impl:
///
/// ```rust
/// use buzz_events::Payload;
///
/// struct OrderPlaced {
///     id: u64,
/// }
///
/// impl Payload for OrderPlaced {}
/// ```
pub trait Payload: Any + Send + Sync {
    /// Whether this value stands for "no payload".
    ///
    /// Failures of listeners handling an absent payload are dropped instead
    /// of being reported to error listeners.
    fn is_absent(&self) -> bool {
        false
    }
}

impl Payload for () {
    fn is_absent(&self) -> bool {
        true
    }
}

impl<T: Send + Sync + 'static> Payload for Option<T> {
    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl Payload for serde_json::Value {
    fn is_absent(&self) -> bool {
        self.is_null()
    }
}

impl<T: Payload> Payload for Box<T> {
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: Payload> Payload for Arc<T> {
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: Send + Sync + 'static> Payload for Vec<T> {}

macro_rules! present_payload {
    ($($ty:ty),* $(,)?) => {
        $(impl Payload for $ty {})*
    };
}

present_payload!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);
