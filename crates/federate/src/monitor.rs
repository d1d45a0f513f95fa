use std::fmt::Write as _;
use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use emsn_dis::pdu::{Pdu, decode};
use emsn_dis::{EntityCatalog, Identity, MulticastTransport, TransportConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Prints every PDU seen on the group until `duration` runs out.
pub fn run(
    config: &TransportConfig,
    identity: &Identity,
    catalog: &EntityCatalog,
    duration: Duration,
) -> Result<()> {
    let mut transport = MulticastTransport::open(config)?;
    log::info!(
        "monitoring {} from {} for {:?}",
        config.destination(),
        transport.local_addr(),
        duration
    );

    let start = Instant::now();
    let mut seen = 0u64;
    while start.elapsed() < duration {
        for (bytes, from) in transport.receive()? {
            seen += 1;
            println!("{}", describe_datagram(&bytes, from, identity, catalog));
        }
        thread::sleep(POLL_INTERVAL);
    }

    log::info!("{} datagrams received", seen);
    Ok(())
}

pub fn describe_datagram(
    bytes: &[u8],
    from: SocketAddr,
    identity: &Identity,
    catalog: &EntityCatalog,
) -> String {
    match decode(bytes) {
        Ok(pdu) => describe(&pdu, identity, catalog),
        Err(e) => format!("undecodable datagram from {} ({} bytes): {}", from, bytes.len(), e),
    }
}

pub fn describe(pdu: &Pdu, identity: &Identity, catalog: &EntityCatalog) -> String {
    let header = pdu.header();
    let seconds = header.timestamp.seconds_past_hour();
    let stamp = format!("{:02}:{:06.3}", (seconds / 60.0) as u32, seconds % 60.0);

    let mut out = String::new();
    match pdu {
        Pdu::EntityState(es) => {
            let direction = if identity.owns(&es.entity_id) {
                "SENT"
            } else {
                "RECEIVED"
            };
            let state = es.to_entity_state(catalog);
            let _ = writeln!(out, "{} Entity State {} at {}", direction, es.entity_id, stamp);
            let _ = writeln!(out, "  type:     {} ({})", state.entity_type, es.entity_type);
            let _ = writeln!(out, "  marking:  {:?}", state.marking);
            let _ = writeln!(
                out,
                "  position: {:.6}, {:.6}, {:.2}",
                state.position.latitude_deg, state.position.longitude_deg, state.position.altitude_m
            );
            let _ = write!(
                out,
                "  attitude: {:.2}, {:.2}, {:.2} deg",
                state.attitude.yaw.to_degrees(),
                state.attitude.pitch.to_degrees(),
                state.attitude.roll.to_degrees()
            );
        }
        Pdu::Start(start) => {
            let _ = write!(
                out,
                "Start/Resume from {} at {} (request {})",
                start.originating, stamp, start.request_id
            );
        }
        Pdu::Stop(stop) => {
            let _ = write!(
                out,
                "Stop/Freeze from {} at {} (reason {}, request {})",
                stop.originating, stamp, stop.reason, stop.request_id
            );
        }
        Pdu::Unsupported { header, body } => {
            let _ = write!(
                out,
                "PDU type {} family {} at {} ({} byte body)",
                header.pdu_type.code(),
                header.protocol_family.code(),
                stamp,
                body.len()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use emsn_dis::{EntityState, PduCodec};

    use super::*;

    fn at() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(3600 * 480_000 + 754)
    }

    #[test]
    fn own_and_foreign_entities() {
        let codec = PduCodec::default();
        let state = EntityState::default()
            .with_position(57.66, 12.44, 0.0)
            .with_marking("Hi Reto");
        let ours = Identity::new(2, 1, 1);
        let theirs = Identity::new(5, 1, 1);

        let pdu = codec.entity_state_pdu(&ours, 4, &state, at()).unwrap();
        let text = describe(&Pdu::EntityState(pdu.clone()), &ours, codec.catalog());
        assert!(text.starts_with("SENT Entity State 2:1:4 at 12:34.000"));
        assert!(text.contains("generic_ship_container_class_medium (1.3.0.61.2.1.0)"));
        assert!(text.contains("57.660000, 12.440000"));
        assert!(text.contains("\"Hi Reto\""));

        let text = describe(&Pdu::EntityState(pdu), &theirs, codec.catalog());
        assert!(text.starts_with("RECEIVED"));
    }

    #[test]
    fn management_and_garbage() {
        let codec = PduCodec::default();
        let identity = Identity::default();
        let from: SocketAddr = "10.0.0.5:20000".parse().unwrap();

        let start = codec.encode_start(&identity, 1, at(), at());
        let text = describe_datagram(&start, from, &identity, codec.catalog());
        assert_eq!(text, "Start/Resume from 2:1:0 at 12:34.000 (request 1)");

        let text = describe_datagram(&[1, 2, 3], from, &identity, codec.catalog());
        assert!(text.starts_with("undecodable datagram from 10.0.0.5:20000 (3 bytes)"));
    }
}
