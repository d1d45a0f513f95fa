use glam::{DVec3, Vec3};

use crate::entity::{
    AngularVelocity, Appearance, Attitude, EntityCatalog, EntityState, EntityTypeCode,
};
use crate::error::{DecodingError, EncodingError};
use crate::geo;
use crate::identity::EntityId;

use super::header::{HEADER_SIZE, PduHeader, PduType};
use super::records::{ArticulationParameter, DeadReckoning, Marking};
use super::wire::{WireReader, WireWriter};

/// Force ID "friendly".
pub const FORCE_FRIENDLY: u8 = 1;

/// Entity State PDU (type 1), everything in the DIS world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStatePdu {
    pub header: PduHeader,
    pub entity_id: EntityId,
    pub force_id: u8,
    pub entity_type: EntityTypeCode,
    pub alternative_entity_type: EntityTypeCode,
    /// ECEF metres per second.
    pub linear_velocity: Vec3,
    /// ECEF metres.
    pub location: DVec3,
    /// `(psi, theta, phi)` in radians.
    pub orientation: Vec3,
    pub appearance: Appearance,
    pub dead_reckoning: DeadReckoning,
    pub marking: Marking,
    pub capabilities: u32,
    pub articulation_parameters: Vec<ArticulationParameter>,
}

impl EntityStatePdu {
    /// Size without articulation parameters.
    pub const BASE_SIZE: usize = 144;

    pub fn size(&self) -> usize {
        Self::BASE_SIZE + self.articulation_parameters.len() * ArticulationParameter::SIZE
    }

    /// The count field is one byte wide, which also keeps the length within `u16`.
    pub const MAX_ARTICULATION_PARAMETERS: usize = u8::MAX as usize;

    pub fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let count = u8::try_from(self.articulation_parameters.len()).map_err(|_| {
            EncodingError::TooManyArticulationParameters {
                count: self.articulation_parameters.len(),
                max: Self::MAX_ARTICULATION_PARAMETERS,
            }
        })?;

        let mut w = WireWriter::with_capacity(self.size());
        let mut header = self.header;
        header.length = self.size() as u16;
        header.write(&mut w);

        w.entity_id(&self.entity_id);
        w.u8(self.force_id);
        w.u8(count);
        w.entity_type(&self.entity_type);
        w.entity_type(&self.alternative_entity_type);
        w.vec3(self.linear_velocity);
        w.dvec3(self.location);
        w.vec3(self.orientation);
        w.u32(self.appearance.bits());
        self.dead_reckoning.write(&mut w);
        self.marking.write(&mut w);
        w.u32(self.capabilities);
        for articulation in &self.articulation_parameters {
            articulation.write(&mut w);
        }

        debug_assert_eq!(w.len(), self.size());
        Ok(w.finish())
    }

    pub(crate) fn read(header: PduHeader, r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        let available = HEADER_SIZE + r.remaining();
        if available < Self::BASE_SIZE {
            return Err(DecodingError::BodyTooShort {
                pdu_type: PduType::EntityState.code(),
                expected: Self::BASE_SIZE,
                actual: available,
            });
        }

        let entity_id = r.entity_id()?;
        let force_id = r.u8()?;
        let articulation_count = r.u8()? as usize;
        let entity_type = r.entity_type()?;
        let alternative_entity_type = r.entity_type()?;
        let linear_velocity = r.vec3()?;
        let location = r.dvec3()?;
        let orientation = r.vec3()?;
        let appearance = Appearance::from_bits(r.u32()?);
        let dead_reckoning = DeadReckoning::read(r)?;
        let marking = Marking::read(r)?;
        let capabilities = r.u32()?;

        let expected = Self::BASE_SIZE + articulation_count * ArticulationParameter::SIZE;
        if available < expected {
            return Err(DecodingError::BodyTooShort {
                pdu_type: PduType::EntityState.code(),
                expected,
                actual: available,
            });
        }
        let articulation_parameters = (0..articulation_count)
            .map(|_| ArticulationParameter::read(r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            header,
            entity_id,
            force_id,
            entity_type,
            alternative_entity_type,
            linear_velocity,
            location,
            orientation,
            appearance,
            dead_reckoning,
            marking,
            capabilities,
            articulation_parameters,
        })
    }

    /// Converts back to the local-frame view a simulator works with.
    pub fn to_entity_state(&self, catalog: &EntityCatalog) -> EntityState {
        let position = geo::ecef_to_geodetic(self.location);
        let psi = self.orientation.x as f64;
        let theta = self.orientation.y as f64;
        let phi = self.orientation.z as f64;

        let local = geo::attitude_from_dis(&position, psi, theta, phi);
        let body_to_world = geo::rotation_zyx(psi, theta, phi);
        let body_velocity = body_to_world.transpose() * self.linear_velocity.as_dvec3();
        let rates = self.dead_reckoning.angular_velocity;

        EntityState {
            position,
            attitude: Attitude::new(local.x as f32, local.y as f32, local.z as f32),
            linear_velocity: body_velocity.as_vec3(),
            angular_velocity: AngularVelocity::new(rates.z, rates.y, rates.x),
            entity_type: catalog.describe(&self.entity_type),
            marking: self.marking.text(),
            appearance: self.appearance,
        }
    }
}
