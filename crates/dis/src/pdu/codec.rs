use std::time::SystemTime;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityCatalog, EntityState};
use crate::error::{DecodingError, EncodingError};
use crate::geo;
use crate::identity::{EntityId, Identity};

use super::entity_state::{EntityStatePdu, FORCE_FRIENDLY};
use super::header::{HEADER_SIZE, PduHeader, PduType};
use super::management::{FROZEN_RUN_CLOCK_RECEIVE, REASON_TERMINATION, StartPdu, StopPdu};
use super::records::{DRM_RVW, DeadReckoning, Marking};
use super::time::{ClockTime, Timestamp, TimestampKind};
use super::wire::WireReader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Cut markings to 11 characters instead of rejecting them.
    pub truncate_marking: bool,
    pub timestamp_kind: TimestampKind,
    pub force_id: u8,
    pub dead_reckoning: u8,
    pub stop_reason: u8,
    pub frozen_behavior: u8,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            truncate_marking: true,
            timestamp_kind: TimestampKind::Relative,
            force_id: FORCE_FRIENDLY,
            dead_reckoning: DRM_RVW,
            stop_reason: REASON_TERMINATION,
            frozen_behavior: FROZEN_RUN_CLOCK_RECEIVE,
        }
    }
}

/// A decoded datagram.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    EntityState(EntityStatePdu),
    Start(StartPdu),
    Stop(StopPdu),
    Unsupported { header: PduHeader, body: Vec<u8> },
}

impl Pdu {
    pub fn header(&self) -> &PduHeader {
        match self {
            Self::EntityState(pdu) => &pdu.header,
            Self::Start(pdu) => &pdu.header,
            Self::Stop(pdu) => &pdu.header,
            Self::Unsupported { header, .. } => header,
        }
    }

    pub fn pdu_type(&self) -> PduType {
        self.header().pdu_type
    }
}

/// Builds the PDUs a federate emits.
///
/// Encoding is pure: the same inputs always give the same bytes.
#[derive(Debug, Clone, Default)]
pub struct PduCodec {
    options: CodecOptions,
    catalog: EntityCatalog,
}

impl PduCodec {
    pub fn new(options: CodecOptions, catalog: EntityCatalog) -> Self {
        Self { options, catalog }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    fn header(
        &self,
        identity: &Identity,
        pdu_type: PduType,
        size: usize,
        at: SystemTime,
    ) -> PduHeader {
        let timestamp = Timestamp::at(at, self.options.timestamp_kind);
        PduHeader::new(identity.exercise_id, pdu_type, timestamp, size as u16)
    }

    /// Start/Resume sent at `at`, asking receivers to run their simulation
    /// clocks from `simulation_time`.
    pub fn start_pdu(
        &self,
        identity: &Identity,
        request_id: u32,
        at: SystemTime,
        simulation_time: SystemTime,
    ) -> StartPdu {
        let kind = self.options.timestamp_kind;
        StartPdu {
            header: self.header(identity, PduType::StartResume, StartPdu::SIZE, at),
            originating: identity.management_entity(),
            receiving: EntityId::ALL,
            real_world_time: ClockTime::at(at, kind),
            simulation_time: ClockTime::at(simulation_time, kind),
            request_id,
        }
    }

    pub fn encode_start(
        &self,
        identity: &Identity,
        request_id: u32,
        at: SystemTime,
        simulation_time: SystemTime,
    ) -> Vec<u8> {
        self.start_pdu(identity, request_id, at, simulation_time)
            .encode()
    }

    pub fn stop_pdu(&self, identity: &Identity, request_id: u32, at: SystemTime) -> StopPdu {
        StopPdu {
            header: self.header(identity, PduType::StopFreeze, StopPdu::SIZE, at),
            originating: identity.management_entity(),
            receiving: EntityId::ALL,
            real_world_time: ClockTime::at(at, self.options.timestamp_kind),
            reason: self.options.stop_reason,
            frozen_behavior: self.options.frozen_behavior,
            request_id,
        }
    }

    pub fn encode_stop(&self, identity: &Identity, request_id: u32, at: SystemTime) -> Vec<u8> {
        self.stop_pdu(identity, request_id, at).encode()
    }

    pub fn entity_state_pdu(
        &self,
        identity: &Identity,
        entity_id: u16,
        state: &EntityState,
        at: SystemTime,
    ) -> Result<EntityStatePdu, EncodingError> {
        state.validate()?;
        let entity_type = self
            .catalog
            .resolve(&state.entity_type)
            .ok_or_else(|| EncodingError::UnknownEntityType(state.entity_type.clone()))?;
        let marking = Marking::ascii(&state.marking, self.options.truncate_marking)?;

        let attitude = state.attitude;
        let body_to_world = geo::body_to_ecef(
            &state.position,
            attitude.yaw as f64,
            attitude.pitch as f64,
            attitude.roll as f64,
        );
        let orientation = geo::euler_zyx(&body_to_world);
        let velocity = body_to_world * state.linear_velocity.as_dvec3();
        let rates = state.angular_velocity;

        Ok(EntityStatePdu {
            header: self.header(identity, PduType::EntityState, EntityStatePdu::BASE_SIZE, at),
            entity_id: identity.entity(entity_id),
            force_id: self.options.force_id,
            entity_type,
            alternative_entity_type: entity_type,
            linear_velocity: velocity.as_vec3(),
            location: geo::geodetic_to_ecef(&state.position),
            orientation: orientation.as_vec3(),
            appearance: state.appearance,
            dead_reckoning: DeadReckoning::new(
                self.options.dead_reckoning,
                Vec3::new(rates.roll_rate, rates.pitch_rate, rates.yaw_rate),
            ),
            marking,
            capabilities: 0,
            articulation_parameters: Vec::new(),
        })
    }

    pub fn encode_entity_state(
        &self,
        identity: &Identity,
        entity_id: u16,
        state: &EntityState,
        at: SystemTime,
    ) -> Result<Vec<u8>, EncodingError> {
        self.entity_state_pdu(identity, entity_id, state, at)?
            .encode()
    }
}

/// Parses one datagram.
pub fn decode(data: &[u8]) -> Result<Pdu, DecodingError> {
    let header = PduHeader::parse(data)?;
    let mut r = WireReader::new(data);
    r.skip(HEADER_SIZE)?;

    let pdu = match header.pdu_type {
        PduType::EntityState => Pdu::EntityState(EntityStatePdu::read(header, &mut r)?),
        PduType::StartResume => Pdu::Start(StartPdu::read(header, &mut r)?),
        PduType::StopFreeze => Pdu::Stop(StopPdu::read(header, &mut r)?),
        PduType::Other(_) => Pdu::Unsupported {
            header,
            body: r.rest().to_vec(),
        },
    };
    Ok(pdu)
}
