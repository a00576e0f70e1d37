//! KspioLink: the board side of the KSPIO link.
//!
//! Owns the serial port, the frame decoder and all link state. The main
//! loop calls [`KspioLink::input`] and [`KspioLink::output`] alternately;
//! neither blocks.

use embedded_hal::delay::DelayNs;
use kspio_proto::{
    send_record, ByteSink, ByteSource, ControlPacket, DecodeResult, EncodeError, FrameDecoder,
    FramingError, Record, VesselData, KSPIO_REGISTRY,
};

use crate::clock::Clock;
use crate::config::LinkConfig;
use crate::gate::OutputGate;
use crate::indicator::{AlertState, Indicators};
use crate::supervisor::{LinkState, LinkSupervisor};

/// Outcome of one [`KspioLink::input`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Nothing completed this poll.
    Idle,
    /// Host handshake received and answered.
    Handshake,
    /// New telemetry stored and alerts refreshed.
    VesselData,
    /// A complete frame failed its checksum.
    ChecksumFailed,
    /// A header named an unknown id or the wrong length.
    Rejected(FramingError),
    /// The host went silent; all lamps are off.
    Disconnected,
}

enum Polled {
    Frame(Option<Record>),
    Quiet(LinkEvent),
}

/// Board-side link engine.
///
/// `P` is the serial port, `C` the millisecond clock and `I` the status
/// lamps.
pub struct KspioLink<P, C, I> {
    port: P,
    clock: C,
    indicators: I,
    decoder: FrameDecoder<2>,
    supervisor: LinkSupervisor,
    gate: OutputGate,
    config: LinkConfig,
    control: ControlPacket,
    vessel: Option<VesselData>,
    alerts: AlertState,
}

impl<P, C, I> KspioLink<P, C, I>
where
    P: ByteSource + ByteSink,
    C: Clock,
    I: Indicators,
{
    pub fn new(port: P, clock: C, indicators: I, config: LinkConfig) -> Self {
        Self {
            port,
            clock,
            indicators,
            decoder: FrameDecoder::new(KSPIO_REGISTRY),
            supervisor: LinkSupervisor::new(config.idle_timeout_ms),
            gate: OutputGate::new(config.output_period_ms),
            config,
            control: ControlPacket::neutral(),
            vessel: None,
            alerts: AlertState::default(),
        }
    }

    /// Light every lamp for the configured time, then turn them all off.
    pub fn lamp_test<D: DelayNs>(&mut self, delay: &mut D) {
        self.indicators.all_on();
        delay.delay_ms(self.config.lamp_test_ms);
        self.indicators.all_off();
    }

    /// Poll the decoder once and react to whatever it produced.
    ///
    /// # Errors
    ///
    /// Returns an error only if the handshake reply could not be written;
    /// link state has already been updated in that case.
    pub fn input(&mut self) -> Result<LinkEvent, EncodeError> {
        let now = self.clock.now_millis();

        let polled = match self.decoder.poll_once(&mut self.port) {
            DecodeResult::FrameReady(frame) => {
                trace!("frame id={=u8} len={}", frame.id, frame.payload.len());
                Polled::Frame(Record::from_frame(&frame))
            }
            DecodeResult::ChecksumFailed => Polled::Quiet(LinkEvent::ChecksumFailed),
            DecodeResult::Rejected(err) => Polled::Quiet(LinkEvent::Rejected(err)),
            DecodeResult::NoData | DecodeResult::Syncing | DecodeResult::AwaitingPayload => {
                Polled::Quiet(LinkEvent::Idle)
            }
        };

        match polled {
            Polled::Frame(record) => self.on_frame(now, record),
            Polled::Quiet(event) => Ok(self.on_quiet(now, event)),
        }
    }

    fn on_frame(&mut self, now: u32, record: Option<Record>) -> Result<LinkEvent, EncodeError> {
        if self.supervisor.on_frame(now) {
            debug!("link up at {=u32} ms", now);
        }
        self.indicators.set_connected(true);

        match record {
            Some(Record::Handshake(hello)) => {
                debug!("handshake {=u8} {=u8} {=u8}", hello.m1, hello.m2, hello.m3);
                send_record(&mut self.port, &self.config.handshake_reply)?;
                Ok(LinkEvent::Handshake)
            }
            Some(Record::VesselData(vessel)) => {
                let alerts = AlertState::evaluate(&vessel, &self.config.alerts);
                if alerts != self.alerts {
                    debug!("alerts caution={} warning={}", alerts.caution, alerts.warning);
                }
                alerts.apply(&mut self.indicators);
                self.alerts = alerts;
                self.vessel = Some(vessel);
                Ok(LinkEvent::VesselData)
            }
            None => {
                warn!("registered frame without a record type");
                Ok(LinkEvent::Idle)
            }
        }
    }

    fn on_quiet(&mut self, now: u32, event: LinkEvent) -> LinkEvent {
        match event {
            LinkEvent::ChecksumFailed => warn!("checksum mismatch"),
            LinkEvent::Rejected(err) => warn!("frame rejected: {}", err),
            _ => {}
        }

        if self.supervisor.check_idle(now) {
            warn!("link idle, going dark");
            self.indicators.all_off();
            self.alerts = AlertState::default();
            return LinkEvent::Disconnected;
        }
        event
    }

    /// Send the control record if the output period has elapsed.
    ///
    /// Returns whether a record was written. Nothing is sent while the link
    /// is down, though the period still restarts.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the port.
    pub fn output(&mut self) -> Result<bool, EncodeError> {
        self.output_with(|_| {})
    }

    /// Like [`output`](Self::output), but lets `update` edit the control
    /// record right before it is sent. `update` only runs when a record
    /// is actually going out.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the port.
    pub fn output_with<F>(&mut self, update: F) -> Result<bool, EncodeError>
    where
        F: FnOnce(&mut ControlPacket),
    {
        let now = self.clock.now_millis();
        if !self.gate.should_send(now) || !self.supervisor.is_connected() {
            return Ok(false);
        }

        update(&mut self.control);
        send_record(&mut self.port, &self.control)?;
        Ok(true)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.supervisor.state()
    }

    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    #[inline]
    #[must_use]
    pub fn alerts(&self) -> AlertState {
        self.alerts
    }

    /// Last telemetry received, if any.
    #[must_use]
    pub fn vessel(&self) -> Option<&VesselData> {
        self.vessel.as_ref()
    }

    #[must_use]
    pub fn control(&self) -> &ControlPacket {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut ControlPacket {
        &mut self.control
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    /// Decompose the link into its port, clock and indicators.
    pub fn into_parts(self) -> (P, C, I) {
        (self.port, self.clock, self.indicators)
    }
}
