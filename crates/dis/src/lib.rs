pub mod clock;
pub mod driver;
pub mod entity;
pub mod error;
pub mod geo;
pub mod identity;
pub mod pdu;
pub mod session;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{LoopReport, SimulationLoop};
pub use entity::{
    AngularVelocity, Appearance, AppearanceFlags, Attitude, CONTAINER_SHIP_MEDIUM,
    CONTAINER_SHIP_SMALL, EntityCatalog, EntityState, EntityTypeCode,
};
pub use error::{DecodingError, DisError, EncodingError, InvalidStateError, NetworkError};
pub use geo::Geodetic;
pub use identity::{EntityId, Identity};
pub use pdu::{
    CodecOptions, EntityStatePdu, Pdu, PduCodec, PduHeader, PduType, TimestampKind, decode,
};
pub use session::{DisSession, SendOutcome, SessionOptions, SessionState, SessionStats};
pub use transport::{
    DEFAULT_GROUP, DEFAULT_PORT, DatagramTransport, MemoryTransport, MulticastTransport, SentLog,
    TransportConfig, TransportStats,
};
