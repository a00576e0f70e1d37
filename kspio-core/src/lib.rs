//! Platform-agnostic KSPIO link engine.
//!
//! This crate runs the board side of the KSPIO link on top of
//! [`kspio_proto`] framing, without any chip-specific dependencies. It can
//! be used both in embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! - [`link`]: Top-level engine ([`KspioLink`], [`LinkEvent`])
//! - [`supervisor`]: Connected/Disconnected tracking ([`LinkSupervisor`])
//! - [`gate`]: Control record pacing ([`OutputGate`])
//! - [`indicator`]: Status lamps and alert policy ([`Indicators`], [`AlertState`])
//! - [`controls`]: Switch sampling and throttle scaling ([`ControlInputs`])
//! - [`clock`]: Millisecond time source ([`Clock`])
//! - [`config`]: Compile-time settings ([`LinkConfig`], [`DEFAULT_CONFIG`])
//!
//! # Main loop
//!
//! ```rust,ignore
//! let mut link = KspioLink::new(port, clock, lamps, DEFAULT_CONFIG);
//! link.lamp_test(&mut delay);
//!
//! loop {
//!     let _ = link.input();
//!     let _ = link.output_with(|packet| switches.sample(packet));
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and link logging
//! - **`embedded-io`**: Enable `embedded-io` serial adapters in `kspio-proto`

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod controls;
pub mod gate;
pub mod indicator;
pub mod link;
pub mod supervisor;

// Re-export main types at crate root
pub use clock::Clock;
pub use config::{AlertThresholds, LinkConfig, BAUD_RATE, DEFAULT_CONFIG};
pub use controls::{throttle_from_adc, ControlInputs, THROTTLE_DEADBAND, THROTTLE_MAX};
pub use gate::OutputGate;
pub use indicator::{AlertState, Indicators, PinIndicators};
pub use link::{KspioLink, LinkEvent};
pub use supervisor::{LinkState, LinkSupervisor};
