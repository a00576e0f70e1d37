//! Millisecond time source.

/// Monotonic millisecond counter. Wraps at `u32::MAX`; consumers compare
/// instants with `wrapping_sub`.
///
/// Implementations backed by an interrupt-driven timer must return a value
/// that is never torn by a concurrent update.
pub trait Clock {
    fn now_millis(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u32 {
        (**self).now_millis()
    }
}
