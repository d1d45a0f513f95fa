use glam::Vec3;

use crate::error::{DecodingError, EncodingError};

use super::wire::{WireReader, WireWriter};

pub const MARKING_LEN: usize = 11;
pub const CHARSET_ASCII: u8 = 1;

/// Entity Marking record: character set plus 11 NUL-padded characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marking {
    pub character_set: u8,
    pub characters: [u8; MARKING_LEN],
}

impl Marking {
    /// ASCII marking from free text. Non-ASCII characters become `?`.
    pub fn ascii(text: &str, truncate: bool) -> Result<Self, EncodingError> {
        let len = text.chars().count();
        if len > MARKING_LEN && !truncate {
            return Err(EncodingError::MarkingTooLong {
                len,
                max: MARKING_LEN,
            });
        }

        let mut characters = [0u8; MARKING_LEN];
        for (slot, c) in characters.iter_mut().zip(text.chars()) {
            *slot = if c.is_ascii() { c as u8 } else { b'?' };
        }

        Ok(Self {
            character_set: CHARSET_ASCII,
            characters,
        })
    }

    pub fn text(&self) -> String {
        self.characters
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect()
    }

    pub(crate) fn write(&self, w: &mut WireWriter) {
        w.u8(self.character_set);
        w.bytes(&self.characters);
    }

    pub(crate) fn read(r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        let character_set = r.u8()?;
        let mut characters = [0u8; MARKING_LEN];
        characters.copy_from_slice(r.take(MARKING_LEN)?);
        Ok(Self {
            character_set,
            characters,
        })
    }
}

impl Default for Marking {
    fn default() -> Self {
        Self {
            character_set: CHARSET_ASCII,
            characters: [0; MARKING_LEN],
        }
    }
}

/// DRM(R,V,W): high speed or manoeuvring entity, extrapolating orientation.
pub const DRM_RVW: u8 = 4;
pub const DR_OTHER_PARAMETERS_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadReckoning {
    pub algorithm: u8,
    pub other_parameters: [u8; DR_OTHER_PARAMETERS_LEN],
    pub linear_acceleration: Vec3,
    /// Body axis rates: x roll, y pitch, z yaw.
    pub angular_velocity: Vec3,
}

impl DeadReckoning {
    pub const SIZE: usize = 40;

    pub fn new(algorithm: u8, angular_velocity: Vec3) -> Self {
        Self {
            algorithm,
            other_parameters: [0; DR_OTHER_PARAMETERS_LEN],
            linear_acceleration: Vec3::ZERO,
            angular_velocity,
        }
    }

    pub(crate) fn write(&self, w: &mut WireWriter) {
        w.u8(self.algorithm);
        w.bytes(&self.other_parameters);
        w.vec3(self.linear_acceleration);
        w.vec3(self.angular_velocity);
    }

    pub(crate) fn read(r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        let algorithm = r.u8()?;
        let mut other_parameters = [0u8; DR_OTHER_PARAMETERS_LEN];
        other_parameters.copy_from_slice(r.take(DR_OTHER_PARAMETERS_LEN)?);
        Ok(Self {
            algorithm,
            other_parameters,
            linear_acceleration: r.vec3()?,
            angular_velocity: r.vec3()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArticulationParameter {
    pub type_designator: u8,
    pub change_indicator: u8,
    pub attached_to: u16,
    pub parameter_type: u32,
    pub value: u64,
}

impl ArticulationParameter {
    pub const SIZE: usize = 16;

    pub fn value_f64(&self) -> f64 {
        f64::from_bits(self.value)
    }

    pub(crate) fn write(&self, w: &mut WireWriter) {
        w.u8(self.type_designator);
        w.u8(self.change_indicator);
        w.u16(self.attached_to);
        w.u32(self.parameter_type);
        w.u64(self.value);
    }

    pub(crate) fn read(r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        Ok(Self {
            type_designator: r.u8()?,
            change_indicator: r.u8()?,
            attached_to: r.u16()?,
            parameter_type: r.u32()?,
            value: r.u64()?,
        })
    }
}
