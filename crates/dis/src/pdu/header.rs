use crate::error::DecodingError;

use super::time::Timestamp;
use super::wire::{WireReader, WireWriter};

/// IEEE 1278.1a-1998.
pub const PROTOCOL_VERSION: u8 = 6;
pub const HEADER_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduType {
    EntityState,
    StartResume,
    StopFreeze,
    Other(u8),
}

impl PduType {
    pub const fn code(self) -> u8 {
        match self {
            Self::EntityState => 1,
            Self::StartResume => 13,
            Self::StopFreeze => 14,
            Self::Other(code) => code,
        }
    }

    pub const fn family(self) -> ProtocolFamily {
        match self {
            Self::EntityState => ProtocolFamily::EntityInformation,
            Self::StartResume | Self::StopFreeze => ProtocolFamily::SimulationManagement,
            Self::Other(_) => ProtocolFamily::Other(0),
        }
    }
}

impl From<u8> for PduType {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::EntityState,
            13 => Self::StartResume,
            14 => Self::StopFreeze,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    EntityInformation,
    SimulationManagement,
    Other(u8),
}

impl ProtocolFamily {
    pub const fn code(self) -> u8 {
        match self {
            Self::EntityInformation => 1,
            Self::SimulationManagement => 5,
            Self::Other(code) => code,
        }
    }
}

impl From<u8> for ProtocolFamily {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::EntityInformation,
            5 => Self::SimulationManagement,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub pdu_type: PduType,
    pub protocol_family: ProtocolFamily,
    pub timestamp: Timestamp,
    pub length: u16,
}

impl PduHeader {
    pub fn new(exercise_id: u8, pdu_type: PduType, timestamp: Timestamp, length: u16) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            exercise_id,
            pdu_type,
            protocol_family: pdu_type.family(),
            timestamp,
            length,
        }
    }

    pub(crate) fn write(&self, w: &mut WireWriter) {
        w.u8(self.protocol_version);
        w.u8(self.exercise_id);
        w.u8(self.pdu_type.code());
        w.u8(self.protocol_family.code());
        w.u32(self.timestamp.raw());
        w.u16(self.length);
        w.u16(0);
    }

    pub(crate) fn read(r: &mut WireReader<'_>) -> Result<Self, DecodingError> {
        let protocol_version = r.u8()?;
        let exercise_id = r.u8()?;
        let pdu_type = PduType::from(r.u8()?);
        let protocol_family = ProtocolFamily::from(r.u8()?);
        let timestamp = Timestamp::from_raw(r.u32()?);
        let length = r.u16()?;
        r.skip(2)?;

        Ok(Self {
            protocol_version,
            exercise_id,
            pdu_type,
            protocol_family,
            timestamp,
            length,
        })
    }

    /// Reads the header and checks the declared length against the datagram.
    pub fn parse(data: &[u8]) -> Result<Self, DecodingError> {
        let mut r = WireReader::new(data);
        let header = Self::read(&mut r)?;
        if header.length as usize != data.len() {
            return Err(DecodingError::LengthMismatch {
                declared: header.length as usize,
                actual: data.len(),
            });
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let header = PduHeader::new(99, PduType::StartResume, Timestamp::from_raw(0x0102_0304), 44);
        let mut w = WireWriter::with_capacity(HEADER_SIZE);
        header.write(&mut w);
        let bytes = w.finish();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..4], &[6, 99, 13, 5]);
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
        assert_eq!(&bytes[8..10], &[0, 44]);
        assert_eq!(&bytes[10..12], &[0, 0]);
    }

    #[test]
    fn unknown_types_are_preserved() {
        assert_eq!(PduType::from(25), PduType::Other(25));
        assert_eq!(PduType::from(25).code(), 25);
        assert_eq!(ProtocolFamily::from(4).code(), 4);
    }

    #[test]
    fn parse_checks_length() {
        let header = PduHeader::new(1, PduType::EntityState, Timestamp::default(), 20);
        let mut w = WireWriter::with_capacity(HEADER_SIZE);
        header.write(&mut w);
        let bytes = w.finish();

        assert_eq!(
            PduHeader::parse(&bytes),
            Err(DecodingError::LengthMismatch {
                declared: 20,
                actual: 12
            })
        );
        assert!(matches!(
            PduHeader::parse(&bytes[..5]),
            Err(DecodingError::Truncated { .. })
        ));
    }
}
