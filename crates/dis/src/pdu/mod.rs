//! DIS PDU encoding and decoding.

mod codec;
mod entity_state;
mod header;
mod management;
mod records;
mod time;
mod wire;

pub use codec::{CodecOptions, Pdu, PduCodec, decode};
pub use entity_state::{EntityStatePdu, FORCE_FRIENDLY};
pub use header::{HEADER_SIZE, PROTOCOL_VERSION, PduHeader, PduType, ProtocolFamily};
pub use management::{FROZEN_RUN_CLOCK_RECEIVE, REASON_TERMINATION, StartPdu, StopPdu};
pub use records::{
    ArticulationParameter, CHARSET_ASCII, DRM_RVW, DeadReckoning, MARKING_LEN, Marking,
};
pub use time::{ClockTime, Timestamp, TimestampKind};
