//! Connected/Disconnected tracking from frame activity.

/// Link liveness as seen from the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
}

/// Tracks the time of the last accepted frame and drops the link after a
/// period of silence.
///
/// Only [`on_frame`](Self::on_frame) connects. Checksum failures and
/// rejected frames are not activity.
#[derive(Debug, Clone)]
pub struct LinkSupervisor {
    state: LinkState,
    last_activity: u32,
    idle_timeout_ms: u32,
}

impl LinkSupervisor {
    #[must_use]
    pub const fn new(idle_timeout_ms: u32) -> Self {
        Self {
            state: LinkState::Disconnected,
            last_activity: 0,
            idle_timeout_ms,
        }
    }

    /// Record a valid frame received at `now`.
    ///
    /// Returns `true` if this connected a previously disconnected link.
    pub fn on_frame(&mut self, now: u32) -> bool {
        self.last_activity = now;
        let was = self.state;
        self.state = LinkState::Connected;
        was == LinkState::Disconnected
    }

    /// Check for idle timeout at `now`.
    ///
    /// Returns `true` exactly once per connection, on the call that moves
    /// the link to `Disconnected`.
    pub fn check_idle(&mut self, now: u32) -> bool {
        if self.state == LinkState::Disconnected {
            return false;
        }
        if now.wrapping_sub(self.last_activity) > self.idle_timeout_ms {
            self.state = LinkState::Disconnected;
            self.last_activity = now;
            return true;
        }
        false
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    #[inline]
    #[must_use]
    pub fn last_activity(&self) -> u32 {
        self.last_activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let mut sup = LinkSupervisor::new(2000);
        assert_eq!(sup.state(), LinkState::Disconnected);
        assert!(!sup.check_idle(10_000));
    }

    #[test]
    fn test_frame_connects() {
        let mut sup = LinkSupervisor::new(2000);
        assert!(sup.on_frame(100));
        assert!(sup.is_connected());
        assert!(!sup.on_frame(150));
        assert_eq!(sup.last_activity(), 150);
    }

    #[test]
    fn test_timeout_is_strict() {
        let mut sup = LinkSupervisor::new(2000);
        sup.on_frame(1000);
        assert!(!sup.check_idle(3000));
        assert!(sup.is_connected());
        assert!(sup.check_idle(3001));
        assert!(!sup.is_connected());
    }

    #[test]
    fn test_timeout_reported_once() {
        let mut sup = LinkSupervisor::new(2000);
        sup.on_frame(0);
        let transitions = (0..20u32)
            .map(|i| sup.check_idle(i * 500))
            .filter(|&t| t)
            .count();
        assert_eq!(transitions, 1);
    }

    #[test]
    fn test_activity_keeps_link_up() {
        let mut sup = LinkSupervisor::new(2000);
        for t in (0..20_000u32).step_by(1500) {
            sup.on_frame(t);
            assert!(!sup.check_idle(t + 1999));
        }
        assert!(sup.is_connected());
    }

    #[test]
    fn test_timeout_across_wrap() {
        let mut sup = LinkSupervisor::new(2000);
        sup.on_frame(u32::MAX - 500);
        assert!(!sup.check_idle(1000));
        assert!(sup.check_idle(1500));
    }
}
