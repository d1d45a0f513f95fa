//! Federate lifecycle: announce with Start/Resume, publish Entity State
//! PDUs, leave with Stop/Freeze.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::entity::{EntityCatalog, EntityState};
use crate::error::{DisError, InvalidStateError};
use crate::identity::Identity;
use crate::pdu::{CodecOptions, PduCodec};
use crate::transport::{DatagramTransport, MulticastTransport, TransportConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Unopened,
    Open,
    Closed,
}

/// Result of a best-effort announcement (Start or Stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(usize),
    Failed,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub codec: CodecOptions,
    pub catalog: EntityCatalog,
    /// Simulation time announced in Start/Resume. The clock's current time
    /// when unset.
    pub simulation_start: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub pdus_sent: u64,
    pub bytes_sent: u64,
    pub send_failures: u64,
    pub encode_failures: u64,
}

/// One federate's presence in a DIS exercise.
///
/// Every PDU carries the identity given at construction. Sends only happen
/// while the session is [`SessionState::Open`]; dropping an open session
/// closes it.
pub struct DisSession<T: DatagramTransport = MulticastTransport, C: Clock = SystemClock> {
    identity: Identity,
    codec: PduCodec,
    simulation_start: Option<SystemTime>,
    clock: C,
    transport: Option<T>,
    state: SessionState,
    next_request_id: u32,
    stats: SessionStats,
}

impl<T: DatagramTransport> DisSession<T, SystemClock> {
    pub fn new(identity: Identity, options: SessionOptions) -> Self {
        Self::with_clock(identity, options, SystemClock)
    }
}

impl<C: Clock> DisSession<MulticastTransport, C> {
    /// Binds and joins the multicast group, then announces the federate.
    pub fn open(&mut self, config: &TransportConfig) -> Result<SendOutcome, DisError> {
        self.expect_state(SessionState::Unopened, "open")?;
        let transport = MulticastTransport::open(config).inspect_err(|e| {
            log::error!("cannot open DIS session on {}: {}", config.destination(), e);
        })?;
        self.open_with(transport)
    }
}

impl<T: DatagramTransport, C: Clock> DisSession<T, C> {
    pub fn with_clock(identity: Identity, options: SessionOptions, clock: C) -> Self {
        Self {
            identity,
            codec: PduCodec::new(options.codec, options.catalog),
            simulation_start: options.simulation_start,
            clock,
            transport: None,
            state: SessionState::Unopened,
            next_request_id: 1,
            stats: SessionStats::default(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn codec(&self) -> &PduCodec {
        &self.codec
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Takes ownership of an already set up transport and sends Start/Resume.
    ///
    /// A failed Start is reported in the outcome; the session is open either way.
    pub fn open_with(&mut self, transport: T) -> Result<SendOutcome, DisError> {
        self.expect_state(SessionState::Unopened, "open")?;

        log::info!(
            "DIS session {}:{} exercise {} open on {}",
            self.identity.site_id,
            self.identity.application_id,
            self.identity.exercise_id,
            transport.destination()
        );
        self.transport = Some(transport);
        self.state = SessionState::Open;

        let request_id = self.next_request_id();
        let now = self.clock.now();
        let simulation_time = self.simulation_start.unwrap_or(now);
        let datagram = self
            .codec
            .encode_start(&self.identity, request_id, now, simulation_time);
        Ok(self.announce(&datagram, "Start/Resume"))
    }

    /// Encodes `state` as entity `entity_id` of this federate and sends it.
    pub fn tick(&mut self, entity_id: u16, state: EntityState) -> Result<usize, DisError> {
        self.expect_state(SessionState::Open, "tick")?;

        let datagram = self
            .codec
            .encode_entity_state(&self.identity, entity_id, &state, self.clock.now())
            .inspect_err(|_| self.stats.encode_failures += 1)?;

        let bytes = self.send(&datagram)?;
        log::debug!(
            "Entity State {} ({} bytes)",
            self.identity.entity(entity_id),
            bytes
        );
        Ok(bytes)
    }

    /// Sends Stop/Freeze and releases the transport. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), DisError> {
        match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Unopened => {
                return Err(InvalidStateError {
                    operation: "close",
                    state: self.state,
                }
                .into());
            }
            SessionState::Open => {}
        }

        let request_id = self.next_request_id();
        let datagram = self
            .codec
            .encode_stop(&self.identity, request_id, self.clock.now());
        self.announce(&datagram, "Stop/Freeze");

        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.state = SessionState::Closed;
        log::info!(
            "DIS session {}:{} closed ({} PDUs, {} send failures)",
            self.identity.site_id,
            self.identity.application_id,
            self.stats.pdus_sent,
            self.stats.send_failures
        );
        Ok(())
    }

    fn expect_state(
        &self,
        expected: SessionState,
        operation: &'static str,
    ) -> Result<(), InvalidStateError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(InvalidStateError {
                operation,
                state: self.state,
            })
        }
    }

    fn next_request_id(&mut self) -> u32 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    fn send(&mut self, datagram: &[u8]) -> Result<usize, DisError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(InvalidStateError {
                operation: "send",
                state: self.state,
            }
            .into());
        };

        match transport.send(datagram) {
            Ok(bytes) => {
                self.stats.pdus_sent += 1;
                self.stats.bytes_sent += bytes as u64;
                Ok(bytes)
            }
            Err(e) => {
                self.stats.send_failures += 1;
                Err(e.into())
            }
        }
    }

    fn announce(&mut self, datagram: &[u8], what: &str) -> SendOutcome {
        match self.send(datagram) {
            Ok(bytes) => {
                log::debug!("{} sent ({} bytes)", what, bytes);
                SendOutcome::Sent(bytes)
            }
            Err(e) => {
                log::warn!("{} not sent: {}", what, e);
                SendOutcome::Failed
            }
        }
    }
}

impl<T: DatagramTransport, C: Clock> Drop for DisSession<T, C> {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            let _ = self.close();
        }
    }
}
