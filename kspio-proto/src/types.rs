//! Typed views of the KSPIO records: handshake, vessel telemetry, controls.
//!
//! All records are packed little-endian structs whose first byte is the
//! record id, matching the plugin's layout byte for byte.

use core::ops::{BitOr, BitOrAssign};

use crate::encoder::EncodeError;
use crate::frame::Frame;

/// A record with a fixed id and size.
pub trait WireRecord: Sized {
    /// Record id, also the first byte of the encoding.
    const ID: u8;
    /// Encoded size in bytes, id included.
    const SIZE: usize;

    /// Write the record into `buf`, returning [`Self::SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::BufferTooSmall`] if `buf` is shorter than `SIZE`.
    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, EncodeError>;

    /// Parse a record from exactly `SIZE` bytes starting with `ID`.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

/// Little-endian writer over a buffer already checked to be large enough.
struct LeWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> LeWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn i16(&mut self, v: i16) {
        self.put(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.put(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.put(&v.to_le_bytes());
    }

    fn finish(self) -> usize {
        self.pos
    }
}

/// Little-endian reader over a slice already checked to be large enough.
struct LeReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> LeReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }
}

#[inline]
fn check_decode<R: WireRecord>(bytes: &[u8]) -> bool {
    bytes.len() == R::SIZE && bytes[0] == R::ID
}

#[inline]
fn check_encode<R: WireRecord>(buf: &[u8]) -> Result<(), EncodeError> {
    if buf.len() < R::SIZE {
        Err(EncodeError::BufferTooSmall)
    } else {
        Ok(())
    }
}

// --- Handshake --------------------------------------------------------------

/// Handshake record (id 0). The three bytes identify the protocol version.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandshakePacket {
    pub id: u8,
    pub m1: u8,
    pub m2: u8,
    pub m3: u8,
}

impl HandshakePacket {
    /// The board's answer to every handshake from the host.
    pub const REPLY: Self = Self::new(3, 1, 4);

    #[must_use]
    pub const fn new(m1: u8, m2: u8, m3: u8) -> Self {
        Self {
            id: Self::ID,
            m1,
            m2,
            m3,
        }
    }
}

impl WireRecord for HandshakePacket {
    const ID: u8 = 0;
    const SIZE: usize = 4;

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        check_encode::<Self>(buf)?;
        buf[..Self::SIZE].copy_from_slice(&[self.id, self.m1, self.m2, self.m3]);
        Ok(Self::SIZE)
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if !check_decode::<Self>(bytes) {
            return None;
        }
        Some(Self {
            id: bytes[0],
            m1: bytes[1],
            m2: bytes[2],
            m3: bytes[3],
        })
    }
}

// --- Vessel telemetry -------------------------------------------------------

/// Vessel telemetry record (id 1), 44 fields after the id.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VesselData {
    pub id: u8,
    pub ap: f32,
    pub pe: f32,
    pub semi_major_axis: f32,
    pub semi_minor_axis: f32,
    pub vvi: f32,
    pub e: f32,
    pub inc: f32,
    /// Current G-force.
    pub g: f32,
    pub t_ap: i32,
    pub t_pe: i32,
    pub true_anomaly: f32,
    pub density: f32,
    pub period: i32,
    pub r_alt: f32,
    pub alt: f32,
    pub v_surf: f32,
    pub lat: f32,
    pub lon: f32,
    pub liquid_fuel_tot: f32,
    pub liquid_fuel: f32,
    pub oxidizer_tot: f32,
    pub oxidizer: f32,
    pub echarge_tot: f32,
    pub echarge: f32,
    pub mono_prop_tot: f32,
    pub mono_prop: f32,
    pub intake_air_tot: f32,
    pub intake_air: f32,
    pub solid_fuel_tot: f32,
    pub solid_fuel: f32,
    pub xenon_gas_tot: f32,
    pub xenon_gas: f32,
    /// Liquid fuel capacity of the current stage.
    pub liquid_fuel_tot_s: f32,
    /// Liquid fuel remaining in the current stage.
    pub liquid_fuel_s: f32,
    pub oxidizer_tot_s: f32,
    pub oxidizer_s: f32,
    pub mission_time: u32,
    pub delta_time: f32,
    pub v_orbit: f32,
    pub mn_time: u32,
    pub mn_delta_v: f32,
    pub pitch: f32,
    pub roll: f32,
    pub heading: f32,
}

impl VesselData {
    /// Stage liquid fuel as a percentage of stage capacity.
    ///
    /// `None` when the capacity is zero, negative or not finite.
    #[must_use]
    pub fn stage_fuel_percent(&self) -> Option<f32> {
        let capacity = self.liquid_fuel_tot_s;
        if !capacity.is_finite() || capacity <= 0.0 {
            return None;
        }
        let pct = 100.0 * self.liquid_fuel_s / capacity;
        pct.is_finite().then_some(pct)
    }
}

impl WireRecord for VesselData {
    const ID: u8 = 1;
    const SIZE: usize = 177;

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        check_encode::<Self>(buf)?;
        let mut w = LeWriter::new(buf);
        w.u8(self.id);
        for v in [
            self.ap,
            self.pe,
            self.semi_major_axis,
            self.semi_minor_axis,
            self.vvi,
            self.e,
            self.inc,
            self.g,
        ] {
            w.f32(v);
        }
        w.i32(self.t_ap);
        w.i32(self.t_pe);
        w.f32(self.true_anomaly);
        w.f32(self.density);
        w.i32(self.period);
        for v in [
            self.r_alt,
            self.alt,
            self.v_surf,
            self.lat,
            self.lon,
            self.liquid_fuel_tot,
            self.liquid_fuel,
            self.oxidizer_tot,
            self.oxidizer,
            self.echarge_tot,
            self.echarge,
            self.mono_prop_tot,
            self.mono_prop,
            self.intake_air_tot,
            self.intake_air,
            self.solid_fuel_tot,
            self.solid_fuel,
            self.xenon_gas_tot,
            self.xenon_gas,
            self.liquid_fuel_tot_s,
            self.liquid_fuel_s,
            self.oxidizer_tot_s,
            self.oxidizer_s,
        ] {
            w.f32(v);
        }
        w.u32(self.mission_time);
        w.f32(self.delta_time);
        w.f32(self.v_orbit);
        w.u32(self.mn_time);
        for v in [self.mn_delta_v, self.pitch, self.roll, self.heading] {
            w.f32(v);
        }
        Ok(w.finish())
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if !check_decode::<Self>(bytes) {
            return None;
        }
        let mut r = LeReader::new(bytes);
        // Field order is the wire order.
        Some(Self {
            id: r.u8(),
            ap: r.f32(),
            pe: r.f32(),
            semi_major_axis: r.f32(),
            semi_minor_axis: r.f32(),
            vvi: r.f32(),
            e: r.f32(),
            inc: r.f32(),
            g: r.f32(),
            t_ap: r.i32(),
            t_pe: r.i32(),
            true_anomaly: r.f32(),
            density: r.f32(),
            period: r.i32(),
            r_alt: r.f32(),
            alt: r.f32(),
            v_surf: r.f32(),
            lat: r.f32(),
            lon: r.f32(),
            liquid_fuel_tot: r.f32(),
            liquid_fuel: r.f32(),
            oxidizer_tot: r.f32(),
            oxidizer: r.f32(),
            echarge_tot: r.f32(),
            echarge: r.f32(),
            mono_prop_tot: r.f32(),
            mono_prop: r.f32(),
            intake_air_tot: r.f32(),
            intake_air: r.f32(),
            solid_fuel_tot: r.f32(),
            solid_fuel: r.f32(),
            xenon_gas_tot: r.f32(),
            xenon_gas: r.f32(),
            liquid_fuel_tot_s: r.f32(),
            liquid_fuel_s: r.f32(),
            oxidizer_tot_s: r.f32(),
            oxidizer_s: r.f32(),
            mission_time: r.u32(),
            delta_time: r.f32(),
            v_orbit: r.f32(),
            mn_time: r.u32(),
            mn_delta_v: r.f32(),
            pitch: r.f32(),
            roll: r.f32(),
            heading: r.f32(),
        })
    }
}

// --- Controls ---------------------------------------------------------------

/// Main control toggles as a bitfield.
///
/// ```
/// use kspio_proto::MainControls;
///
/// let mut controls = MainControls::SAS | MainControls::GEAR;
/// controls.set(MainControls::SAS, false);
/// assert!(controls.contains(MainControls::GEAR));
/// assert!(!controls.contains(MainControls::SAS));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MainControls(pub u8);

impl MainControls {
    pub const STAGE: Self = Self(1 << 0);
    pub const ABORT: Self = Self(1 << 1);
    pub const PRECISION: Self = Self(1 << 2);
    pub const BRAKES: Self = Self(1 << 3);
    pub const GEAR: Self = Self(1 << 4);
    pub const LIGHTS: Self = Self(1 << 5);
    pub const RCS: Self = Self(1 << 6);
    pub const SAS: Self = Self(1 << 7);

    pub const NONE: Self = Self(0);

    /// Single-bit value for bit `n`, `None` if `n` is out of range.
    #[inline]
    #[must_use]
    pub const fn bit(n: u8) -> Option<Self> {
        match 1u8.checked_shl(n as u32) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set or clear the given bit(s), leaving all others untouched.
    #[inline]
    pub fn set(&mut self, flags: Self, on: bool) {
        if on {
            self.0 |= flags.0;
        } else {
            self.0 &= !flags.0;
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl BitOr for MainControls {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MainControls {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Action groups as a 16-bit field; bit `n` is group `n`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlGroups(pub u16);

impl ControlGroups {
    pub const NONE: Self = Self(0);

    /// Single-group value for group `n`, `None` if `n` is out of range.
    #[inline]
    #[must_use]
    pub const fn group(n: u8) -> Option<Self> {
        match 1u16.checked_shl(n as u32) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn set(&mut self, groups: Self, on: bool) {
        if on {
            self.0 |= groups.0;
        } else {
            self.0 &= !groups.0;
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Flight mode carried in the control record.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ControlMode {
    #[default]
    Stage = 0,
    Docking = 1,
    Map = 2,
}

/// Control record (id 101), sent from the board to the host.
///
/// Axes range -1000..=1000, throttle 0..=1000.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlPacket {
    pub id: u8,
    pub main_controls: MainControls,
    pub mode: u8,
    pub control_groups: ControlGroups,
    pub additional_1: u8,
    pub additional_2: u8,
    pub pitch: i16,
    pub roll: i16,
    pub yaw: i16,
    pub tx: i16,
    pub ty: i16,
    pub tz: i16,
    pub throttle: u16,
}

impl ControlPacket {
    /// All toggles off, axes centred, throttle closed.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            id: Self::ID,
            main_controls: MainControls::NONE,
            mode: ControlMode::Stage as u8,
            control_groups: ControlGroups::NONE,
            additional_1: 0,
            additional_2: 0,
            pitch: 0,
            roll: 0,
            yaw: 0,
            tx: 0,
            ty: 0,
            tz: 0,
            throttle: 0,
        }
    }

    /// Set or clear bit `n` of the main controls. Out-of-range `n` is ignored.
    #[inline]
    pub fn set_main_control(&mut self, n: u8, on: bool) {
        if let Some(flag) = MainControls::bit(n) {
            self.main_controls.set(flag, on);
        }
    }

    /// Set or clear control group `n`. Out-of-range `n` is ignored.
    #[inline]
    pub fn set_control_group(&mut self, n: u8, on: bool) {
        if let Some(group) = ControlGroups::group(n) {
            self.control_groups.set(group, on);
        }
    }

    #[inline]
    pub fn set_mode(&mut self, mode: ControlMode) {
        self.mode = mode as u8;
    }
}

impl Default for ControlPacket {
    fn default() -> Self {
        Self::neutral()
    }
}

impl WireRecord for ControlPacket {
    const ID: u8 = 101;
    const SIZE: usize = 21;

    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        check_encode::<Self>(buf)?;
        let mut w = LeWriter::new(buf);
        w.u8(self.id);
        w.u8(self.main_controls.raw());
        w.u8(self.mode);
        w.u16(self.control_groups.raw());
        w.u8(self.additional_1);
        w.u8(self.additional_2);
        for axis in [self.pitch, self.roll, self.yaw, self.tx, self.ty, self.tz] {
            w.i16(axis);
        }
        w.u16(self.throttle);
        Ok(w.finish())
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if !check_decode::<Self>(bytes) {
            return None;
        }
        let mut r = LeReader::new(bytes);
        Some(Self {
            id: r.u8(),
            main_controls: MainControls(r.u8()),
            mode: r.u8(),
            control_groups: ControlGroups(r.u16()),
            additional_1: r.u8(),
            additional_2: r.u8(),
            pitch: r.i16(),
            roll: r.i16(),
            yaw: r.i16(),
            tx: r.i16(),
            ty: r.i16(),
            tz: r.i16(),
            throttle: r.u16(),
        })
    }
}

// --- Dispatch ---------------------------------------------------------------

/// A received record, dispatched on the frame id.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Record {
    Handshake(HandshakePacket),
    VesselData(VesselData),
}

impl Record {
    /// Interpret a decoded frame. `None` for ids without a typed record.
    #[must_use]
    pub fn from_frame(frame: &Frame<'_>) -> Option<Self> {
        match frame.id {
            HandshakePacket::ID => HandshakePacket::decode(frame.payload).map(Self::Handshake),
            VesselData::ID => VesselData::decode(frame.payload).map(Self::VesselData),
            _ => None,
        }
    }
}
