//! Status indicators and the alert policy that drives them.

use embedded_hal::digital::{OutputPin, PinState};
use kspio_proto::VesselData;

use crate::config::AlertThresholds;

/// The three status lamps: connected (green), caution (yellow) and
/// warning (red).
///
/// Lamps are best-effort; failures to drive them are swallowed.
pub trait Indicators {
    fn set_connected(&mut self, on: bool);
    fn set_caution(&mut self, on: bool);
    fn set_warning(&mut self, on: bool);

    fn all_off(&mut self) {
        self.set_connected(false);
        self.set_caution(false);
        self.set_warning(false);
    }

    fn all_on(&mut self) {
        self.set_connected(true);
        self.set_caution(true);
        self.set_warning(true);
    }
}

impl<T: Indicators + ?Sized> Indicators for &mut T {
    fn set_connected(&mut self, on: bool) {
        (**self).set_connected(on);
    }

    fn set_caution(&mut self, on: bool) {
        (**self).set_caution(on);
    }

    fn set_warning(&mut self, on: bool) {
        (**self).set_warning(on);
    }

    fn all_off(&mut self) {
        (**self).all_off();
    }

    fn all_on(&mut self) {
        (**self).all_on();
    }
}

/// [`Indicators`] on three active-high GPIO outputs.
pub struct PinIndicators<G, Y, R> {
    green: G,
    yellow: Y,
    red: R,
}

impl<G: OutputPin, Y: OutputPin, R: OutputPin> PinIndicators<G, Y, R> {
    pub fn new(green: G, yellow: Y, red: R) -> Self {
        Self { green, yellow, red }
    }

    pub fn into_parts(self) -> (G, Y, R) {
        (self.green, self.yellow, self.red)
    }
}

impl<G: OutputPin, Y: OutputPin, R: OutputPin> Indicators for PinIndicators<G, Y, R> {
    fn set_connected(&mut self, on: bool) {
        let _ = self.green.set_state(PinState::from(on));
    }

    fn set_caution(&mut self, on: bool) {
        let _ = self.yellow.set_state(PinState::from(on));
    }

    fn set_warning(&mut self, on: bool) {
        let _ = self.red.set_state(PinState::from(on));
    }
}

/// Two-level alert derived from one telemetry record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertState {
    pub caution: bool,
    pub warning: bool,
}

impl AlertState {
    /// Evaluate G-force and stage liquid fuel against `limits`.
    ///
    /// Stateless: every record is judged on its own. A stage without liquid
    /// fuel capacity raises no fuel alert.
    #[must_use]
    pub fn evaluate(vessel: &VesselData, limits: &AlertThresholds) -> Self {
        let fuel = vessel.stage_fuel_percent();
        let fuel_below = |pct: f32| fuel.is_some_and(|f| f < pct);

        Self {
            caution: vessel.g > limits.g_caution || fuel_below(limits.fuel_caution_pct),
            warning: vessel.g > limits.g_warning || fuel_below(limits.fuel_warning_pct),
        }
    }

    /// Push this state to the caution and warning lamps.
    pub fn apply<I: Indicators + ?Sized>(&self, indicators: &mut I) {
        indicators.set_caution(self.caution);
        indicators.set_warning(self.warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    fn vessel(g: f32, fuel: f32, capacity: f32) -> VesselData {
        VesselData {
            id: 1,
            g,
            liquid_fuel_s: fuel,
            liquid_fuel_tot_s: capacity,
            ..VesselData::default()
        }
    }

    fn evaluate(v: &VesselData) -> AlertState {
        AlertState::evaluate(v, &DEFAULT_CONFIG.alerts)
    }

    #[test]
    fn test_high_g_raises_both() {
        let state = evaluate(&vessel(9.5, 100.0, 100.0));
        assert!(state.caution);
        assert!(state.warning);
    }

    #[test]
    fn test_moderate_g_caution_only() {
        let state = evaluate(&vessel(6.0, 50.0, 100.0));
        assert_eq!(
            state,
            AlertState {
                caution: true,
                warning: false
            }
        );
    }

    #[test]
    fn test_low_fuel_raises_both() {
        let state = evaluate(&vessel(1.0, 3.0, 100.0));
        assert!(state.warning);
        assert!(state.caution);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(evaluate(&vessel(5.0, 10.0, 100.0)), AlertState::default());
        let state = evaluate(&vessel(9.0, 5.0, 100.0));
        assert!(state.caution);
        assert!(!state.warning);
    }

    #[test]
    fn test_no_capacity_no_fuel_alert() {
        assert_eq!(evaluate(&vessel(1.0, 0.0, 0.0)), AlertState::default());
        assert_eq!(evaluate(&vessel(1.0, 0.0, f32::NAN)), AlertState::default());
    }

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn test_pin_indicators() {
        let mut lamps = PinIndicators::new(
            FakePin::default(),
            FakePin::default(),
            FakePin::default(),
        );

        lamps.all_on();
        AlertState {
            caution: false,
            warning: true,
        }
        .apply(&mut lamps);

        let (g, y, r) = lamps.into_parts();
        assert!(g.high);
        assert!(!y.high);
        assert!(r.high);
    }

    #[test]
    fn test_all_off() {
        let mut lamps = PinIndicators::new(
            FakePin { high: true },
            FakePin { high: true },
            FakePin { high: true },
        );
        lamps.all_off();
        let (g, y, r) = lamps.into_parts();
        assert!(!g.high && !y.high && !r.high);
    }
}
