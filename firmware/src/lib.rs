//! KSPIO flight-controls board for RP2040.
//!
//! This crate wires the platform-agnostic [`kspio_core`] link engine to
//! RP2040 peripherals: a buffered UART towards the host, three status LEDs
//! and a bank of toggle switches.
//!
//! # Pins
//!
//! - GPIO 0/1: UART0 TX/RX (38400 8N1)
//! - GPIO 2/3/4: SAS, RCS and action group 1 switches (pulled up)
//! - GPIO 13/14/15: green, yellow and red LEDs

#![no_std]

use embassy_rp::gpio::{Input, Output};
use embassy_time::Instant;

// Re-export core types for convenience
pub use kspio_core::{
    Clock, ControlInputs, KspioLink, LinkEvent, PinIndicators, BAUD_RATE, DEFAULT_CONFIG,
};
pub use kspio_proto::IoPort;

/// UART ring buffer size in each direction; one telemetry frame fits.
pub const UART_BUFFER_SIZE: usize = 256;

/// Milliseconds since boot from the embassy time driver.
///
/// `Instant::now` reads the driver's 64-bit tick counter without tearing
/// against the timer interrupt, so the main loop always sees a consistent
/// value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_millis(&self) -> u32 {
        // Truncation gives the wrapping u32 counter the link expects
        Instant::now().as_millis() as u32
    }
}

/// Green/yellow/red status LEDs.
pub type BoardLamps<'d> = PinIndicators<Output<'d>, Output<'d>, Output<'d>>;

/// SAS, RCS and action group 1 switches.
pub type BoardSwitches<'d> = ControlInputs<Input<'d>, Input<'d>, Input<'d>>;
