//! Rate limiting for outbound control records.

/// Approves a transmission when more than `period_ms` has passed since the
/// last approval.
#[derive(Debug, Clone)]
pub struct OutputGate {
    period_ms: u32,
    last_sent: u32,
}

impl OutputGate {
    #[must_use]
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_sent: 0,
        }
    }

    /// Whether a send is due at `now`. Approving resets the period.
    pub fn should_send(&mut self, now: u32) -> bool {
        if now.wrapping_sub(self.last_sent) > self.period_ms {
            self.last_sent = now;
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }
}
