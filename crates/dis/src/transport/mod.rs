mod memory;
mod multicast;
mod stats;

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

pub use memory::{MemoryTransport, SentDatagram, SentLog};
pub use multicast::{MAX_DATAGRAM_SIZE, MulticastTransport};
pub use stats::TransportStats;

pub const DEFAULT_GROUP: Ipv4Addr = Ipv4Addr::new(239, 239, 239, 239);
pub const DEFAULT_PORT: u16 = 20000;

/// Where PDUs go and how the multicast socket is set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    #[serde(alias = "multicast_address")]
    pub group: Ipv4Addr,
    pub port: u16,
    /// Interface used for group membership and outgoing multicast.
    pub local_interface: Ipv4Addr,
    pub ttl: u32,
    pub loopback: bool,
}

impl TransportConfig {
    pub fn new(group: Ipv4Addr, port: u16) -> Self {
        Self {
            group,
            port,
            ..Self::default()
        }
    }

    pub fn destination(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.group, self.port))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP,
            port: DEFAULT_PORT,
            local_interface: Ipv4Addr::UNSPECIFIED,
            ttl: 1,
            loopback: true,
        }
    }
}

/// A datagram sink the session writes PDUs into.
pub trait DatagramTransport {
    /// Sends one datagram to the destination, returning the bytes written.
    fn send(&mut self, datagram: &[u8]) -> Result<usize, NetworkError>;

    /// Releases the underlying resources. Calling it again does nothing.
    fn close(&mut self);

    fn destination(&self) -> SocketAddr;

    fn stats(&self) -> &TransportStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.destination(), "239.239.239.239:20000".parse().unwrap());
        assert_eq!(config.local_interface, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.ttl, 1);
        assert!(config.loopback);
    }

    #[test]
    fn new_keeps_socket_defaults() {
        let config = TransportConfig::new(Ipv4Addr::new(239, 1, 2, 3), 3000);
        assert_eq!(config.destination(), "239.1.2.3:3000".parse().unwrap());
        assert_eq!(config.ttl, 1);
    }
}
