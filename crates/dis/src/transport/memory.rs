use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::NetworkError;

use super::stats::TransportStats;
use super::{DatagramTransport, TransportConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDatagram {
    pub destination: SocketAddr,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct LogInner {
    datagrams: Vec<SentDatagram>,
    closed: bool,
}

/// Shared record of everything a [`MemoryTransport`] sent.
#[derive(Debug, Clone, Default)]
pub struct SentLog {
    inner: Arc<Mutex<LogInner>>,
}

impl SentLog {
    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn datagrams(&self) -> Vec<SentDatagram> {
        self.lock().datagrams.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().datagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().datagrams.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// In-process transport for tests and dry runs.
///
/// Keeps every datagram in a [`SentLog`] that outlives the transport, and can
/// be switched into failing sends to exercise error paths.
#[derive(Debug)]
pub struct MemoryTransport {
    destination: SocketAddr,
    log: SentLog,
    fail_sends: Arc<AtomicBool>,
    closed: bool,
    stats: TransportStats,
}

impl MemoryTransport {
    pub fn new(destination: SocketAddr) -> Self {
        Self {
            destination,
            log: SentLog::default(),
            fail_sends: Arc::new(AtomicBool::new(false)),
            closed: false,
            stats: TransportStats::default(),
        }
    }

    pub fn for_config(config: &TransportConfig) -> Self {
        Self::new(config.destination())
    }

    pub fn log(&self) -> SentLog {
        self.log.clone()
    }

    /// While the returned flag is set, every send fails.
    pub fn fail_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_sends)
    }
}

impl DatagramTransport for MemoryTransport {
    fn send(&mut self, datagram: &[u8]) -> Result<usize, NetworkError> {
        let failure = if self.closed {
            Some(io::Error::new(io::ErrorKind::NotConnected, "transport closed"))
        } else if self.fail_sends.load(Ordering::SeqCst) {
            Some(io::Error::new(io::ErrorKind::NetworkUnreachable, "injected failure"))
        } else {
            None
        };

        if let Some(source) = failure {
            self.stats.record_send_failure();
            return Err(NetworkError::SendFailed {
                destination: self.destination,
                source,
            });
        }

        self.log.lock().datagrams.push(SentDatagram {
            destination: self.destination,
            bytes: datagram.to_vec(),
        });
        self.stats.record_sent(datagram.len());
        Ok(datagram.len())
    }

    fn close(&mut self) {
        self.closed = true;
        self.log.lock().closed = true;
    }

    fn destination(&self) -> SocketAddr {
        self.destination
    }

    fn stats(&self) -> &TransportStats {
        &self.stats
    }
}
