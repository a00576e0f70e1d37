//! Static record registry: which ids exist and how long they are.

use crate::types::{HandshakePacket, VesselData, WireRecord};

/// Metadata for one record kind.
///
/// `length` counts the id byte, matching the length byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecordDescriptor {
    pub id: u8,
    pub length: u8,
}

impl RecordDescriptor {
    #[must_use]
    pub const fn new(id: u8, length: u8) -> Self {
        Self { id, length }
    }

    /// Descriptor for a typed record.
    #[must_use]
    pub const fn of<R: WireRecord>() -> Self {
        Self {
            id: R::ID,
            length: R::SIZE as u8,
        }
    }
}

/// Fixed set of receivable records, built once at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRegistry<const N: usize> {
    descriptors: [RecordDescriptor; N],
}

impl<const N: usize> RecordRegistry<N> {
    /// Build a registry. Later duplicates of an id are shadowed by the first.
    #[must_use]
    pub const fn new(descriptors: [RecordDescriptor; N]) -> Self {
        Self { descriptors }
    }

    /// Look up the descriptor for `id`.
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: u8) -> Option<RecordDescriptor> {
        self.descriptors.iter().copied().find(|d| d.id == id)
    }

    /// All registered descriptors.
    #[must_use]
    pub fn descriptors(&self) -> &[RecordDescriptor] {
        &self.descriptors
    }
}

/// Records the board receives from the host: handshake and vessel telemetry.
pub const KSPIO_REGISTRY: RecordRegistry<2> = RecordRegistry::new([
    RecordDescriptor::of::<HandshakePacket>(),
    RecordDescriptor::of::<VesselData>(),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kspio_registry_lengths() {
        assert_eq!(KSPIO_REGISTRY.lookup(0), Some(RecordDescriptor::new(0, 4)));
        assert_eq!(
            KSPIO_REGISTRY.lookup(1),
            Some(RecordDescriptor::new(1, 177))
        );
    }

    #[test]
    fn test_unknown_id_has_no_descriptor() {
        assert_eq!(KSPIO_REGISTRY.lookup(101), None);
        assert_eq!(KSPIO_REGISTRY.lookup(0xFF), None);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let registry = RecordRegistry::new([
            RecordDescriptor::new(7, 3),
            RecordDescriptor::new(7, 9),
        ]);
        assert_eq!(registry.lookup(7).map(|d| d.length), Some(3));
    }
}
