//! Simulation management PDUs announcing a federate joining and leaving.

use crate::error::DecodingError;
use crate::identity::EntityId;

use super::header::{HEADER_SIZE, PduHeader, PduType};
use super::time::ClockTime;
use super::wire::{WireReader, WireWriter};

/// Stop/Freeze reason "termination".
pub const REASON_TERMINATION: u8 = 2;
/// Frozen behaviour: keep the clock running and keep receiving PDUs.
pub const FROZEN_RUN_CLOCK_RECEIVE: u8 = 2;

fn ensure_body(
    pdu_type: PduType,
    expected: usize,
    r: &WireReader<'_>,
) -> Result<(), DecodingError> {
    let actual = HEADER_SIZE + r.remaining();
    if actual < expected {
        return Err(DecodingError::BodyTooShort {
            pdu_type: pdu_type.code(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Start/Resume PDU (type 13).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPdu {
    pub header: PduHeader,
    pub originating: EntityId,
    pub receiving: EntityId,
    pub real_world_time: ClockTime,
    pub simulation_time: ClockTime,
    pub request_id: u32,
}

impl StartPdu {
    pub const SIZE: usize = 44;

    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(Self::SIZE);
        PduHeader {
            length: Self::SIZE as u16,
            ..self.header
        }
        .write(&mut w);
        w.entity_id(&self.originating);
        w.entity_id(&self.receiving);
        w.clock_time(&self.real_world_time);
        w.clock_time(&self.simulation_time);
        w.u32(self.request_id);
        w.finish()
    }

    pub(crate) fn read(header: PduHeader, r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        ensure_body(PduType::StartResume, Self::SIZE, r)?;
        Ok(Self {
            header,
            originating: r.entity_id()?,
            receiving: r.entity_id()?,
            real_world_time: r.clock_time()?,
            simulation_time: r.clock_time()?,
            request_id: r.u32()?,
        })
    }
}

/// Stop/Freeze PDU (type 14).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPdu {
    pub header: PduHeader,
    pub originating: EntityId,
    pub receiving: EntityId,
    pub real_world_time: ClockTime,
    pub reason: u8,
    pub frozen_behavior: u8,
    pub request_id: u32,
}

impl StopPdu {
    pub const SIZE: usize = 40;

    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(Self::SIZE);
        PduHeader {
            length: Self::SIZE as u16,
            ..self.header
        }
        .write(&mut w);
        w.entity_id(&self.originating);
        w.entity_id(&self.receiving);
        w.clock_time(&self.real_world_time);
        w.u8(self.reason);
        w.u8(self.frozen_behavior);
        w.zeros(2);
        w.u32(self.request_id);
        w.finish()
    }

    pub(crate) fn read(header: PduHeader, r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        ensure_body(PduType::StopFreeze, Self::SIZE, r)?;
        let originating = r.entity_id()?;
        let receiving = r.entity_id()?;
        let real_world_time = r.clock_time()?;
        let reason = r.u8()?;
        let frozen_behavior = r.u8()?;
        r.skip(2)?;
        Ok(Self {
            header,
            originating,
            receiving,
            real_world_time,
            reason,
            frozen_behavior,
            request_id: r.u32()?,
        })
    }
}
