//! Compile-time link configuration.

use kspio_proto::HandshakePacket;

/// Serial line speed used by the KSPIO plugin (8N1).
pub const BAUD_RATE: u32 = 38_400;

/// Thresholds for the caution and warning indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertThresholds {
    /// G-force above which caution is raised.
    pub g_caution: f32,
    /// G-force above which warning is raised.
    pub g_warning: f32,
    /// Stage liquid fuel percentage below which caution is raised.
    pub fuel_caution_pct: f32,
    /// Stage liquid fuel percentage below which warning is raised.
    pub fuel_warning_pct: f32,
}

impl AlertThresholds {
    #[must_use]
    pub const fn new(
        g_caution: f32,
        g_warning: f32,
        fuel_caution_pct: f32,
        fuel_warning_pct: f32,
    ) -> Self {
        Self {
            g_caution,
            g_warning,
            fuel_caution_pct,
            fuel_warning_pct,
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        DEFAULT_CONFIG.alerts
    }
}

/// Timing, alert and handshake settings for a [`KspioLink`](crate::KspioLink).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Silence longer than this drops the link.
    pub idle_timeout_ms: u32,
    /// Minimum spacing between control record transmissions.
    pub output_period_ms: u32,
    pub alerts: AlertThresholds,
    /// Sent back for every received handshake.
    pub handshake_reply: HandshakePacket,
    /// How long all lamps stay lit at power-up.
    pub lamp_test_ms: u32,
}

impl LinkConfig {
    #[must_use]
    pub const fn with_idle_timeout(mut self, ms: u32) -> Self {
        self.idle_timeout_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_output_period(mut self, ms: u32) -> Self {
        self.output_period_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_alerts(mut self, alerts: AlertThresholds) -> Self {
        self.alerts = alerts;
        self
    }

    #[must_use]
    pub const fn with_lamp_test(mut self, ms: u32) -> Self {
        self.lamp_test_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_handshake_reply(mut self, reply: HandshakePacket) -> Self {
        self.handshake_reply = reply;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

/// Settings matching the stock KSPIO plugin.
pub const DEFAULT_CONFIG: LinkConfig = LinkConfig {
    idle_timeout_ms: 2000,
    output_period_ms: 25,
    alerts: AlertThresholds::new(5.0, 9.0, 10.0, 5.0),
    handshake_reply: HandshakePacket::REPLY,
    lamp_test_ms: 1000,
};
