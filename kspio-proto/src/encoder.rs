//! Frame encoding: the mirror image of the decoder.
//!
//! # Example
//!
//! ```
//! use kspio_proto::{encode_frame, HandshakePacket, WireRecord};
//!
//! let mut record = [0u8; HandshakePacket::SIZE];
//! HandshakePacket::REPLY.encode_into(&mut record).unwrap();
//!
//! let mut buf = [0u8; 16];
//! let len = encode_frame(&record, &mut buf).unwrap();
//! assert_eq!(&buf[..len], &[0xBE, 0xEF, 0x04, 0x00, 0x03, 0x01, 0x04, 0x02]);
//! ```

use crate::frame::{checksum, FRAME_OVERHEAD, MAX_RECORD_LEN, SYNC};
use crate::io::ByteSink;
use crate::types::WireRecord;

/// Largest encoded frame.
pub const MAX_FRAME_SIZE: usize = MAX_RECORD_LEN + FRAME_OVERHEAD;

/// Error type for encoding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Record is empty or longer than the length byte can express.
    InvalidLength,
    /// The output buffer is too small to hold the encoded frame.
    BufferTooSmall,
    /// The byte sink reported an error.
    WriteError,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidLength => write!(f, "invalid record length"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

#[inline]
fn record_length(record: &[u8]) -> Result<u8, EncodeError> {
    if record.is_empty() || record.len() > MAX_RECORD_LEN {
        return Err(EncodeError::InvalidLength);
    }
    Ok(record.len() as u8)
}

/// Encode `record` (id byte first) into `buf`, returning the frame length.
///
/// # Errors
///
/// [`EncodeError::InvalidLength`] for empty or oversized records,
/// [`EncodeError::BufferTooSmall`] if `buf` cannot hold the frame.
pub fn encode_frame(record: &[u8], buf: &mut [u8]) -> Result<usize, EncodeError> {
    let length = record_length(record)?;
    let total = record.len() + FRAME_OVERHEAD;
    if buf.len() < total {
        return Err(EncodeError::BufferTooSmall);
    }

    buf[..2].copy_from_slice(&SYNC);
    buf[2] = length;
    buf[3..3 + record.len()].copy_from_slice(record);
    buf[total - 1] = checksum(length, record);
    Ok(total)
}

/// Write `record` (id byte first) to `sink` as one frame.
///
/// # Errors
///
/// [`EncodeError::InvalidLength`] for empty or oversized records,
/// [`EncodeError::WriteError`] if the sink fails.
pub fn write_frame<S: ByteSink>(sink: &mut S, record: &[u8]) -> Result<(), EncodeError> {
    let length = record_length(record)?;

    sink.write_all(&SYNC).map_err(|_| EncodeError::WriteError)?;
    sink.write_byte(length).map_err(|_| EncodeError::WriteError)?;
    sink.write_all(record).map_err(|_| EncodeError::WriteError)?;
    sink.write_byte(checksum(length, record))
        .map_err(|_| EncodeError::WriteError)
}

/// Encode a typed record and write it to `sink` as one frame.
///
/// # Errors
///
/// See [`write_frame`].
pub fn send_record<R: WireRecord, S: ByteSink>(
    sink: &mut S,
    record: &R,
) -> Result<(), EncodeError> {
    let mut buf = [0u8; MAX_RECORD_LEN];
    let len = record.encode_into(&mut buf)?;
    write_frame(sink, &buf[..len])
}
