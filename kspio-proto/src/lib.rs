//! Serial framing for the KSPIO link between a flight-controls board and the
//! KSPIO simulator plugin.
//!
//! This crate provides everything needed to move records over the wire:
//!
//! - **Framing**: [`SYNC`], [`checksum`], [`Frame`]
//! - **Registry**: [`RecordRegistry`], [`RecordDescriptor`], [`KSPIO_REGISTRY`]
//! - **Decoding**: [`FrameDecoder`] and its [`DecodeResult`]
//! - **Encoding**: [`encode_frame`], [`write_frame`], [`send_record`]
//! - **Records**: [`HandshakePacket`], [`VesselData`], [`ControlPacket`]
//! - **I/O seams**: [`ByteSource`], [`ByteSink`]
//!
//! # Protocol Format
//!
//! ```text
//! 0xBE 0xEF <length> <id> <payload> <checksum>
//! ```
//!
//! - `length` - record size including the id byte
//! - `id` - record id: 0 handshake, 1 vessel telemetry, 101 controls
//! - `payload` - `length - 1` bytes, packed little-endian
//! - `checksum` - XOR of `length` and every record byte
//!
//! # Example
//!
//! ```
//! use kspio_proto::{
//!     ByteSource, DecodeResult, FrameDecoder, RecordDescriptor, RecordRegistry,
//! };
//!
//! struct Bytes<'a>(&'a [u8]);
//!
//! impl ByteSource for Bytes<'_> {
//!     fn bytes_available(&mut self) -> usize {
//!         self.0.len()
//!     }
//!
//!     fn read_byte(&mut self) -> Option<u8> {
//!         let (first, rest) = self.0.split_first()?;
//!         self.0 = rest;
//!         Some(*first)
//!     }
//! }
//!
//! let registry = RecordRegistry::new([RecordDescriptor::new(1, 4)]);
//! let mut decoder = FrameDecoder::new(registry);
//! let mut wire = Bytes(&[0xBE, 0xEF, 0x04, 0x01, 0x0A, 0x0B, 0x0C, 0x08]);
//!
//! match decoder.poll_once(&mut wire) {
//!     DecodeResult::FrameReady(frame) => assert_eq!(frame.payload, &[1, 10, 11, 12]),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`embedded-io`**: Enable [`IoPort`] for `embedded-io` serial drivers
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod io;
pub mod registry;
pub mod types;

pub use decoder::{DecodeResult, FrameDecoder};
pub use encoder::{encode_frame, send_record, write_frame, EncodeError, MAX_FRAME_SIZE};
pub use frame::{checksum, Frame, FramingError, MARKER_BYTE, SYNC, SYNC_BYTE};
#[cfg(feature = "embedded-io")]
pub use io::IoPort;
pub use io::{ByteSink, ByteSource};
pub use registry::{RecordDescriptor, RecordRegistry, KSPIO_REGISTRY};
pub use types::{
    ControlGroups, ControlMode, ControlPacket, HandshakePacket, MainControls, Record, VesselData,
    WireRecord,
};
