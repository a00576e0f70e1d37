//! Incremental, non-blocking frame decoder.
//!
//! The decoder is driven by [`FrameDecoder::poll_once`], which drains
//! whatever the [`ByteSource`] currently holds and stops at the first
//! completed, failed or rejected frame. A frame may span any number of
//! polls; the partial state lives in the decoder's receive session.
//!
//! Resynchronisation is implicit: outside a frame every byte up to the next
//! `0xBE 0xEF` pair is discarded, so line noise or a reconnect heals without
//! an explicit reset. Once a header has been accepted the frame is
//! length-delimited and sync bytes inside the payload are plain data.

use heapless::Vec;

use crate::frame::{checksum, Frame, FramingError, MARKER_BYTE, SCRATCH_SIZE, SYNC_BYTE};
use crate::io::ByteSource;
use crate::registry::RecordRegistry;

/// Outcome of one decoder poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum DecodeResult<'a> {
    /// Nothing was available to read.
    NoData,
    /// Bytes were consumed but no complete header has been accepted yet.
    Syncing,
    /// Header accepted, payload or checksum still outstanding.
    AwaitingPayload,
    /// A complete frame with a valid checksum.
    FrameReady(Frame<'a>),
    /// A complete frame whose checksum did not match; it was discarded.
    ChecksumFailed,
    /// Header rejected; the decoder is scanning for sync again.
    Rejected(FramingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    SearchSync,
    Marker,
    Length,
    Id { length: u8 },
    Payload { length: u8 },
}

/// Per-poll outcome that does not borrow the scratch buffer.
enum Step {
    Ready { id: u8, length: u8 },
    ChecksumFailed,
    Rejected(FramingError),
}

const _: () = assert!(SCRATCH_SIZE > u8::MAX as usize);

/// Reassembles records from a byte stream.
pub struct FrameDecoder<const N: usize> {
    registry: RecordRegistry<N>,
    state: RxState,
    /// Record bytes, id first. Never grows past the registered length.
    scratch: Vec<u8, SCRATCH_SIZE>,
}

impl<const N: usize> FrameDecoder<N> {
    /// Create a decoder that accepts the records in `registry`.
    #[must_use]
    pub fn new(registry: RecordRegistry<N>) -> Self {
        Self {
            registry,
            state: RxState::SearchSync,
            scratch: Vec::new(),
        }
    }

    /// The registry this decoder validates against.
    #[must_use]
    pub fn registry(&self) -> &RecordRegistry<N> {
        &self.registry
    }

    /// Whether a header has been accepted and the payload is in flight.
    #[inline]
    #[must_use]
    pub fn is_mid_frame(&self) -> bool {
        matches!(self.state, RxState::Payload { .. })
    }

    /// Drop any partial frame and go back to scanning for sync.
    pub fn reset(&mut self) {
        self.state = RxState::SearchSync;
        self.scratch.clear();
    }

    /// Consume available bytes until a frame completes or the source runs dry.
    pub fn poll_once<S: ByteSource>(&mut self, source: &mut S) -> DecodeResult<'_> {
        if source.bytes_available() == 0 {
            return self.idle_result(false);
        }

        let mut consumed = false;
        let mut step = None;
        while source.bytes_available() > 0 {
            let Some(byte) = source.read_byte() else {
                break;
            };
            consumed = true;
            if let Some(s) = self.push_byte(byte) {
                step = Some(s);
                break;
            }
        }

        match step {
            Some(Step::Ready { id, length }) => DecodeResult::FrameReady(Frame {
                id,
                payload: &self.scratch[..length as usize],
            }),
            Some(Step::ChecksumFailed) => DecodeResult::ChecksumFailed,
            Some(Step::Rejected(err)) => DecodeResult::Rejected(err),
            None => self.idle_result(consumed),
        }
    }

    fn idle_result(&self, consumed: bool) -> DecodeResult<'static> {
        match self.state {
            RxState::Payload { .. } => DecodeResult::AwaitingPayload,
            RxState::SearchSync if !consumed => DecodeResult::NoData,
            _ => DecodeResult::Syncing,
        }
    }

    /// Advance the state machine by one byte.
    fn push_byte(&mut self, byte: u8) -> Option<Step> {
        match self.state {
            RxState::SearchSync => {
                if byte == SYNC_BYTE {
                    self.state = RxState::Marker;
                }
                None
            }
            RxState::Marker => {
                self.state = match byte {
                    MARKER_BYTE => RxState::Length,
                    // The byte that broke the pair may start a new one.
                    SYNC_BYTE => RxState::Marker,
                    _ => RxState::SearchSync,
                };
                None
            }
            RxState::Length => {
                self.state = RxState::Id { length: byte };
                None
            }
            RxState::Id { length } => {
                // Validate against the descriptor of this id only.
                let err = match self.registry.lookup(byte) {
                    None => Some(FramingError::UnknownId(byte)),
                    // Length counts the id byte, so zero is never a valid record.
                    Some(desc) if length == 0 || desc.length != length => {
                        Some(FramingError::LengthMismatch {
                            id: byte,
                            declared: length,
                            expected: desc.length,
                        })
                    }
                    Some(_) => None,
                };
                if let Some(err) = err {
                    self.reset();
                    return Some(Step::Rejected(err));
                }

                self.scratch.clear();
                self.scratch.push(byte).ok();
                self.state = RxState::Payload { length };
                None
            }
            RxState::Payload { length } => {
                if self.scratch.len() < length as usize {
                    // Capacity exceeds any u8 length, push cannot fail here.
                    self.scratch.push(byte).ok();
                    return None;
                }

                // All record bytes present: this one is the checksum.
                let id = self.scratch[0];
                let expected = checksum(length, &self.scratch);
                self.state = RxState::SearchSync;
                if expected == byte {
                    Some(Step::Ready { id, length })
                } else {
                    self.scratch.clear();
                    Some(Step::ChecksumFailed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::frame::SYNC;
    use crate::registry::{RecordDescriptor, KSPIO_REGISTRY};
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec as StdVec;

    /// Byte source that only exposes what has been "received" so far.
    struct MockSource {
        bytes: VecDeque<u8>,
    }

    impl MockSource {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.iter().copied().collect(),
            }
        }

        fn feed(&mut self, bytes: &[u8]) {
            self.bytes.extend(bytes.iter().copied());
        }
    }

    impl ByteSource for MockSource {
        fn bytes_available(&mut self) -> usize {
            self.bytes.len()
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.bytes.pop_front()
        }
    }

    const TEST_REGISTRY: RecordRegistry<2> = RecordRegistry::new([
        RecordDescriptor::new(0, 4),
        RecordDescriptor::new(1, 4),
    ]);

    fn frame_bytes(record: &[u8]) -> StdVec<u8> {
        let length = record.len() as u8;
        let mut out = SYNC.to_vec();
        out.push(length);
        out.extend_from_slice(record);
        out.push(checksum(length, record));
        out
    }

    fn expect_frame(result: DecodeResult<'_>) -> (u8, StdVec<u8>) {
        match result {
            DecodeResult::FrameReady(frame) => (frame.id, frame.payload.to_vec()),
            other => panic!("expected FrameReady, got {other:?}"),
        }
    }

    #[test]
    fn test_decodes_reference_frame() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut source = MockSource::new(&[0xBE, 0xEF, 0x04, 0x01, 0x0A, 0x0B, 0x0C, 0x08]);

        let (id, payload) = expect_frame(decoder.poll_once(&mut source));
        assert_eq!(id, 1);
        assert_eq!(payload, vec![0x01, 0x0A, 0x0B, 0x0C]);
    }

    #[test]
    fn test_wrong_reference_checksum_is_detected() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut source = MockSource::new(&[0xBE, 0xEF, 0x04, 0x01, 0x0A, 0x0B, 0x0C, 0xD6]);
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::ChecksumFailed);
    }

    #[test]
    fn test_no_data() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut source = MockSource::new(&[]);
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::NoData);
    }

    #[test]
    fn test_garbage_never_yields_frame() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        // Contains lone 0xBE and 0xEF bytes but never the pair in order.
        let noise = [0x00, 0xEF, 0xBE, 0x12, 0xEF, 0x55, 0xBE, 0xBE, 0x01, 0xFF];
        let mut source = MockSource::new(&noise);

        let result = decoder.poll_once(&mut source);
        assert_eq!(result, DecodeResult::Syncing);
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::NoData);
    }

    #[test]
    fn test_resyncs_after_noise() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut bytes = vec![0x13, 0x37, 0xBE, 0x00];
        bytes.extend(frame_bytes(&[0, 3, 1, 4]));
        let mut source = MockSource::new(&bytes);

        let (id, payload) = expect_frame(decoder.poll_once(&mut source));
        assert_eq!(id, 0);
        assert_eq!(payload, vec![0, 3, 1, 4]);
    }

    #[test]
    fn test_repeated_sync_byte_before_marker() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut bytes = vec![0xBE, 0xBE];
        bytes.extend(&frame_bytes(&[1, 2, 3, 4])[1..]);
        let mut source = MockSource::new(&bytes);

        let (id, _) = expect_frame(decoder.poll_once(&mut source));
        assert_eq!(id, 1);
    }

    #[test]
    fn test_frame_split_across_polls() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let bytes = frame_bytes(&[1, 0xAA, 0xBB, 0xCC]);
        let mut source = MockSource::new(&bytes[..3]);

        assert_eq!(decoder.poll_once(&mut source), DecodeResult::Syncing);
        source.feed(&bytes[3..5]);
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::AwaitingPayload);
        assert!(decoder.is_mid_frame());
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::AwaitingPayload);
        source.feed(&bytes[5..]);

        let (id, payload) = expect_frame(decoder.poll_once(&mut source));
        assert_eq!(id, 1);
        assert_eq!(payload, vec![1, 0xAA, 0xBB, 0xCC]);
        assert!(!decoder.is_mid_frame());
    }

    #[test]
    fn test_sync_bytes_inside_payload_are_data() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let record = [1, 0xBE, 0xEF, 0x04];
        let mut source = MockSource::new(&frame_bytes(&record));

        let (_, payload) = expect_frame(decoder.poll_once(&mut source));
        assert_eq!(payload, record.to_vec());
    }

    #[test]
    fn test_single_byte_corruption_fails_checksum() {
        let good = frame_bytes(&[1, 0x10, 0x20, 0x30]);
        // Corrupt each record byte after the id in turn.
        for pos in 4..good.len() - 1 {
            let mut bytes = good.clone();
            bytes[pos] ^= 0x01;
            let mut decoder = FrameDecoder::new(TEST_REGISTRY);
            let mut source = MockSource::new(&bytes);
            assert_eq!(
                decoder.poll_once(&mut source),
                DecodeResult::ChecksumFailed,
                "corruption at {pos}"
            );
        }
    }

    #[test]
    fn test_xor_cancelling_corruption_goes_undetected() {
        // Known weakness of the XOR checksum: flipping the same bit in two
        // bytes leaves the checksum unchanged.
        let mut bytes = frame_bytes(&[1, 0x10, 0x20, 0x30]);
        bytes[5] ^= 0x40;
        bytes[6] ^= 0x40;
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut source = MockSource::new(&bytes);
        assert!(matches!(
            decoder.poll_once(&mut source),
            DecodeResult::FrameReady(_)
        ));
    }

    #[test]
    fn test_checksum_failure_then_next_frame() {
        let mut bytes = frame_bytes(&[1, 1, 1, 1]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        bytes.extend(frame_bytes(&[1, 2, 2, 2]));

        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut source = MockSource::new(&bytes);
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::ChecksumFailed);
        let (_, payload) = expect_frame(decoder.poll_once(&mut source));
        assert_eq!(payload, vec![1, 2, 2, 2]);
    }

    #[test]
    fn test_unknown_id_rejected() {
        let mut decoder = FrameDecoder::new(TEST_REGISTRY);
        let mut source = MockSource::new(&frame_bytes(&[9, 0, 0, 0]));
        assert_eq!(
            decoder.poll_once(&mut source),
            DecodeResult::Rejected(FramingError::UnknownId(9))
        );
    }

    #[test]
    fn test_length_mismatch_never_overflows() {
        let mut decoder = FrameDecoder::new(KSPIO_REGISTRY);
        // Handshake id with a declared length of 255 followed by a flood.
        let mut bytes = vec![0xBE, 0xEF, 0xFF, 0x00];
        bytes.extend(core::iter::repeat(0x5A).take(600));
        let mut source = MockSource::new(&bytes);

        assert_eq!(
            decoder.poll_once(&mut source),
            DecodeResult::Rejected(FramingError::LengthMismatch {
                id: 0,
                declared: 0xFF,
                expected: 4,
            })
        );
        assert!(!decoder.is_mid_frame());
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::Syncing);
        assert!(decoder.scratch.is_empty());
    }

    #[test]
    fn test_length_checked_against_current_id() {
        // A valid telemetry header followed by a handshake id carrying the
        // telemetry length must still be rejected.
        let mut decoder = FrameDecoder::new(KSPIO_REGISTRY);
        let mut source = MockSource::new(&[0xBE, 0xEF, 177, 0x01]);
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::AwaitingPayload);
        decoder.reset();

        source.feed(&[0xBE, 0xEF, 177, 0x00]);
        assert_eq!(
            decoder.poll_once(&mut source),
            DecodeResult::Rejected(FramingError::LengthMismatch {
                id: 0,
                declared: 177,
                expected: 4,
            })
        );
    }

    #[test]
    fn test_zero_length_header_rejected() {
        let registry = RecordRegistry::new([RecordDescriptor::new(5, 0)]);
        let mut decoder = FrameDecoder::new(registry);
        let mut source = MockSource::new(&[0xBE, 0xEF, 0x00, 0x05, 0x05]);

        assert_eq!(
            decoder.poll_once(&mut source),
            DecodeResult::Rejected(FramingError::LengthMismatch {
                id: 5,
                declared: 0,
                expected: 0,
            })
        );
        assert!(!decoder.is_mid_frame());
        assert_eq!(decoder.poll_once(&mut source), DecodeResult::Syncing);
    }
}
