//! Wire framing constants, checksum and the decoded [`Frame`] view.
//!
//! ```text
//! 0xBE 0xEF <length> <id> <payload: length-1 bytes> <checksum>
//! ```
//!
//! `length` counts the id byte plus the payload. The checksum is the XOR of
//! `length` and every record byte, id included.

/// First sync byte.
pub const SYNC_BYTE: u8 = 0xBE;

/// Second sync byte (marker).
pub const MARKER_BYTE: u8 = 0xEF;

/// Sync sequence as written on the wire.
pub const SYNC: [u8; 2] = [SYNC_BYTE, MARKER_BYTE];

/// Bytes of framing around a record: sync(2) + length(1) + checksum(1).
pub const FRAME_OVERHEAD: usize = 4;

/// Largest record (id included) the length byte can describe.
pub const MAX_RECORD_LEN: usize = u8::MAX as usize;

/// Size of the decoder scratch buffer.
pub const SCRATCH_SIZE: usize = 256;

/// XOR checksum over a record, seeded with the length byte.
#[inline]
#[must_use]
pub fn checksum(length: u8, record: &[u8]) -> u8 {
    record.iter().fold(length, |acc, &b| acc ^ b)
}

/// A validated record, borrowed from the decoder scratch.
///
/// `payload` starts with the id byte, so `payload.len()` equals the
/// length byte that was on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame<'a> {
    pub id: u8,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Record bytes after the id byte. Empty for a bare or empty payload.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &'a [u8] {
        self.payload.get(1..).unwrap_or(&[])
    }
}

/// Header rejected by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// No descriptor registered for this id.
    UnknownId(u8),
    /// Declared length differs from the registered length for the id.
    LengthMismatch { id: u8, declared: u8, expected: u8 },
}

impl core::fmt::Display for FramingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "unknown record id {id}"),
            Self::LengthMismatch {
                id,
                declared,
                expected,
            } => write!(
                f,
                "record {id}: declared length {declared}, expected {expected}"
            ),
        }
    }
}
