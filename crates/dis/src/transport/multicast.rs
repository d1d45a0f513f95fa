use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::NetworkError;

use super::stats::TransportStats;
use super::{DatagramTransport, TransportConfig};

pub const MAX_DATAGRAM_SIZE: usize = 8192;

/// UDP socket bound to the exercise port and joined to the multicast group.
pub struct MulticastTransport {
    socket: Option<UdpSocket>,
    config: TransportConfig,
    local_addr: SocketAddr,
    stats: TransportStats,
    recv_buffer: Box<[u8; MAX_DATAGRAM_SIZE]>,
}

impl MulticastTransport {
    pub fn open(config: &TransportConfig) -> Result<Self, NetworkError> {
        let group = config.group;
        let interface = config.local_interface;
        let join_failed = |source: io::Error| NetworkError::JoinFailed {
            group,
            interface,
            source,
        };

        if !group.is_multicast() {
            return Err(join_failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a multicast address",
            )));
        }

        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let bind_failed = |source: io::Error| NetworkError::BindFailed {
            addr: bind_addr,
            source,
        };

        let socket =
            Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(bind_failed)?;
        socket.set_reuse_address(true).map_err(bind_failed)?;
        socket.bind(&bind_addr.into()).map_err(bind_failed)?;

        socket
            .join_multicast_v4(&group, &interface)
            .map_err(join_failed)?;
        socket.set_multicast_if_v4(&interface).map_err(join_failed)?;
        socket.set_multicast_ttl_v4(config.ttl).map_err(bind_failed)?;
        socket
            .set_multicast_loop_v4(config.loopback)
            .map_err(bind_failed)?;
        socket.set_nonblocking(true).map_err(bind_failed)?;

        let socket: UdpSocket = socket.into();
        let local_addr = socket.local_addr().map_err(bind_failed)?;

        log::debug!(
            "joined {} on {} (bound {}, ttl {}, loopback {})",
            group,
            interface,
            local_addr,
            config.ttl,
            config.loopback
        );

        Ok(Self {
            socket: Some(socket),
            config: config.clone(),
            local_addr,
            stats: TransportStats::default(),
            recv_buffer: Box::new([0u8; MAX_DATAGRAM_SIZE]),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Drains every datagram waiting on the socket without blocking.
    pub fn receive(&mut self) -> Result<Vec<(Vec<u8>, SocketAddr)>, NetworkError> {
        let Some(socket) = &self.socket else {
            return Err(NetworkError::ReceiveFailed(not_connected()));
        };

        let mut datagrams = Vec::new();
        loop {
            match socket.recv_from(&mut self.recv_buffer[..]) {
                Ok((size, addr)) => {
                    self.stats.record_received(size);
                    datagrams.push((self.recv_buffer[..size].to_vec(), addr));
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(NetworkError::ReceiveFailed(e)),
            }
        }

        Ok(datagrams)
    }
}

impl DatagramTransport for MulticastTransport {
    fn send(&mut self, datagram: &[u8]) -> Result<usize, NetworkError> {
        let destination = self.config.destination();
        let result = match &self.socket {
            Some(socket) => socket.send_to(datagram, destination),
            None => Err(not_connected()),
        };

        match result {
            Ok(bytes) => {
                self.stats.record_sent(bytes);
                Ok(bytes)
            }
            Err(source) => {
                self.stats.record_send_failure();
                Err(NetworkError::SendFailed {
                    destination,
                    source,
                })
            }
        }
    }

    fn close(&mut self) {
        let Some(socket) = self.socket.take() else {
            return;
        };
        let TransportConfig {
            group,
            local_interface,
            ..
        } = &self.config;
        if let Err(e) = socket.leave_multicast_v4(group, local_interface) {
            log::debug!("leaving {} failed: {}", self.config.group, e);
        }
        log::debug!("released {}", self.local_addr);
    }

    fn destination(&self) -> SocketAddr {
        self.config.destination()
    }

    fn stats(&self) -> &TransportStats {
        &self.stats
    }
}

impl Drop for MulticastTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport closed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicast_group_is_rejected() {
        let config = TransportConfig::new(Ipv4Addr::new(127, 0, 0, 1), 20000);
        match MulticastTransport::open(&config) {
            Err(err @ NetworkError::JoinFailed { .. }) => assert!(err.is_fatal()),
            Err(other) => panic!("expected JoinFailed, got {other}"),
            Ok(_) => panic!("unicast group accepted"),
        }
    }
}
