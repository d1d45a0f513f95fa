use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use crate::session::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("unknown entity type: {0:?}")]
    UnknownEntityType(String),
    #[error("marking is {len} characters, at most {max} fit")]
    MarkingTooLong { len: usize, max: usize },
    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
    #[error("{count} articulation parameters, at most {max} fit")]
    TooManyArticulationParameters { count: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodingError {
    #[error("datagram too short: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("header declares {declared} bytes but datagram has {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("PDU type {pdu_type} needs {expected} bytes, got {actual}")]
    BodyTooShort {
        pdu_type: u8,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to join multicast group {group} on {interface}: {source}")]
    JoinFailed {
        group: Ipv4Addr,
        interface: Ipv4Addr,
        #[source]
        source: io::Error,
    },
    #[error("send to {destination} failed: {source}")]
    SendFailed {
        destination: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] io::Error),
}

impl NetworkError {
    /// Bind and join failures leave no usable socket behind.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BindFailed { .. } | Self::JoinFailed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {operation} a session that is {state:?}")]
pub struct InvalidStateError {
    pub operation: &'static str,
    pub state: SessionState,
}

#[derive(Debug, thiserror::Error)]
pub enum DisError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}
