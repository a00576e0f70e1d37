//! Physical control inputs feeding the outbound control record.

use embedded_hal::digital::InputPin;
use kspio_proto::{ControlPacket, MainControls};

/// Full-scale throttle value in the control record.
pub const THROTTLE_MAX: u16 = 1000;
/// Ignored band at each end of the throttle ADC range.
pub const THROTTLE_DEADBAND: u16 = 4;
/// Span of a 10-bit ADC reading.
pub const ADC_SPAN: u16 = 1024;

/// Switch bank for SAS, RCS and action group 1.
///
/// Inputs are pulled up; a high level sets the corresponding bit. A pin
/// that fails to read leaves its bit untouched.
pub struct ControlInputs<S, R, C> {
    sas: S,
    rcs: R,
    group1: C,
}

impl<S: InputPin, R: InputPin, C: InputPin> ControlInputs<S, R, C> {
    pub fn new(sas: S, rcs: R, group1: C) -> Self {
        Self { sas, rcs, group1 }
    }

    /// Copy the switch positions into `packet`.
    pub fn sample(&mut self, packet: &mut ControlPacket) {
        if let Ok(on) = self.sas.is_high() {
            packet.main_controls.set(MainControls::SAS, on);
        }
        if let Ok(on) = self.rcs.is_high() {
            packet.main_controls.set(MainControls::RCS, on);
        }
        if let Ok(on) = self.group1.is_high() {
            packet.set_control_group(1, on);
        }
    }
}

/// Map a 10-bit ADC reading onto `0..=THROTTLE_MAX`, clamping `deadband`
/// counts at both ends of the travel.
#[must_use]
pub fn throttle_from_adc(raw: u16, deadband: u16) -> u16 {
    let lo = i32::from(deadband);
    let hi = i32::from(ADC_SPAN) - lo;
    if hi <= lo {
        return 0;
    }
    let scaled = (i32::from(raw) - lo) * i32::from(THROTTLE_MAX) / (hi - lo);
    scaled.clamp(0, i32::from(THROTTLE_MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use kspio_proto::ControlGroups;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, InputPin};

    struct FakeSwitch<'a>(&'a Cell<bool>);

    impl ErrorType for FakeSwitch<'_> {
        type Error = Infallible;
    }

    impl InputPin for FakeSwitch<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    #[test]
    fn test_sample_sets_and_clears() {
        let (sas, rcs, cg1) = (Cell::new(true), Cell::new(false), Cell::new(true));
        let mut inputs = ControlInputs::new(FakeSwitch(&sas), FakeSwitch(&rcs), FakeSwitch(&cg1));

        let mut packet = ControlPacket::neutral();
        packet.main_controls |= MainControls::GEAR | MainControls::RCS;
        inputs.sample(&mut packet);

        assert!(packet.main_controls.contains(MainControls::SAS));
        assert!(!packet.main_controls.contains(MainControls::RCS));
        assert!(packet.main_controls.contains(MainControls::GEAR));
        assert_eq!(packet.control_groups.raw(), 1 << 1);

        sas.set(false);
        cg1.set(false);
        inputs.sample(&mut packet);
        assert_eq!(packet.main_controls, MainControls::GEAR);
        assert_eq!(packet.control_groups, ControlGroups::NONE);
    }

    #[test]
    fn test_throttle_ends() {
        assert_eq!(throttle_from_adc(0, THROTTLE_DEADBAND), 0);
        assert_eq!(throttle_from_adc(4, THROTTLE_DEADBAND), 0);
        assert_eq!(throttle_from_adc(1020, THROTTLE_DEADBAND), 1000);
        assert_eq!(throttle_from_adc(1023, THROTTLE_DEADBAND), 1000);
    }

    #[test]
    fn test_throttle_midpoint() {
        assert_eq!(throttle_from_adc(512, THROTTLE_DEADBAND), 500);
        assert_eq!(throttle_from_adc(512, 0), 500);
    }

    #[test]
    fn test_throttle_degenerate_deadband() {
        assert_eq!(throttle_from_adc(700, 600), 0);
    }
}
