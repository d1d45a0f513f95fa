use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread;
use std::time::{Duration, Instant, UNIX_EPOCH};

use emsn_dis::pdu::{Pdu, decode};
use emsn_dis::{
    DatagramTransport, DisSession, EntityState, Identity, ManualClock, MulticastTransport,
    NetworkError, SessionOptions, TransportConfig,
};

static PORT_COUNTER: AtomicU16 = AtomicU16::new(42000);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(10, Ordering::SeqCst)
}

fn test_config(port: u16) -> TransportConfig {
    TransportConfig::new(Ipv4Addr::new(239, 239, 239, 239), port)
}

/// `None` when this host cannot join multicast groups.
fn open_or_skip(config: &TransportConfig) -> Option<MulticastTransport> {
    match MulticastTransport::open(config) {
        Ok(transport) => Some(transport),
        Err(e @ NetworkError::JoinFailed { .. }) => {
            eprintln!("skipping, multicast unavailable: {e}");
            None
        }
        Err(e) => panic!("open failed: {e}"),
    }
}

fn wait_for_datagrams(transport: &mut MulticastTransport, timeout_ms: u64) -> Vec<Vec<u8>> {
    let start = Instant::now();
    let mut received = Vec::new();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        received.extend(transport.receive().unwrap().into_iter().map(|(bytes, _)| bytes));
        if !received.is_empty() {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    received
}

#[test]
fn two_transports_share_a_group() {
    let config = test_config(next_port());
    let Some(mut sender) = open_or_skip(&config) else {
        return;
    };
    let Some(mut receiver) = open_or_skip(&config) else {
        return;
    };
    assert_eq!(sender.local_addr().port(), config.port);
    assert_eq!(receiver.local_addr().port(), config.port);

    if let Err(e) = sender.send(b"ping") {
        eprintln!("skipping, no multicast route: {e}");
        return;
    }

    let received = wait_for_datagrams(&mut receiver, 500);
    if received.is_empty() {
        eprintln!("skipping, loopback delivery unavailable");
        return;
    }
    assert_eq!(received[0], b"ping");
    assert_eq!(sender.stats().datagrams_sent, 1);
    assert!(receiver.stats().datagrams_received >= 1);
}

#[test]
fn session_announces_on_the_wire() {
    let config = test_config(next_port());
    let Some(mut monitor) = open_or_skip(&config) else {
        return;
    };

    let clock = ManualClock::new(UNIX_EPOCH + Duration::from_secs(3600 * 480_000));
    let mut session: DisSession<MulticastTransport, ManualClock> =
        DisSession::with_clock(Identity::new(2, 1, 1), SessionOptions::default(), clock);
    match session.open(&config) {
        Ok(outcome) if outcome.is_sent() => {}
        Ok(_) => {
            eprintln!("skipping, Start/Resume could not be sent");
            return;
        }
        Err(e) => {
            eprintln!("skipping, multicast unavailable: {e}");
            return;
        }
    }

    let started = wait_for_datagrams(&mut monitor, 500);
    if started.is_empty() {
        eprintln!("skipping, loopback delivery unavailable");
        return;
    }
    assert!(matches!(decode(&started[0]), Ok(Pdu::Start(_))));

    session.tick(1, EntityState::default()).unwrap();
    session.close().unwrap();
    assert!(session.transport().is_none());

    let rest = wait_for_datagrams(&mut monitor, 500);
    assert!(matches!(decode(&rest[0]), Ok(Pdu::EntityState(_))));
}

#[test]
fn closed_transport_refuses_to_send() {
    let config = test_config(next_port());
    let Some(mut transport) = open_or_skip(&config) else {
        return;
    };

    transport.close();
    transport.close();
    assert!(!transport.is_open());
    assert!(matches!(
        transport.send(b"late"),
        Err(NetworkError::SendFailed { .. })
    ));
    assert!(matches!(
        transport.receive(),
        Err(NetworkError::ReceiveFailed(_))
    ));
}
