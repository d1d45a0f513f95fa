mod config;
mod monitor;
mod track;

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use clap::Parser;

use config::FederateConfig;
use emsn_dis::{
    Clock, DatagramTransport, DisSession, ManualClock, MemoryTransport, MulticastTransport,
    SimulationLoop, SystemClock,
};
use track::ShipTrack;

#[derive(Parser)]
#[command(name = "emsn-federate")]
#[command(about = "Sample EMSN DIS federate: sails one ship or watches the exercise")]
struct Args {
    #[arg(short, long, help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Multicast group")]
    group: Option<Ipv4Addr>,

    #[arg(short, long)]
    port: Option<u16>,

    #[arg(long, help = "Local interface for multicast membership")]
    interface: Option<Ipv4Addr>,

    #[arg(long)]
    site: Option<u16>,

    #[arg(long)]
    application: Option<u16>,

    #[arg(short, long)]
    exercise: Option<u8>,

    #[arg(long, help = "Seconds between Entity State PDUs")]
    interval: Option<f64>,

    #[arg(short, long, default_value_t = 10, help = "Entity State PDUs to send")]
    ticks: u32,

    #[arg(long, help = "Print PDUs seen on the group instead of sending")]
    monitor: bool,

    #[arg(long, default_value_t = 30, help = "Seconds to monitor for")]
    duration: u64,

    #[arg(long, help = "Encode without touching the network")]
    dry_run: bool,
}

impl Args {
    fn apply(&self, config: &mut FederateConfig) {
        if let Some(group) = self.group {
            config.transport.group = group;
        }
        if let Some(port) = self.port {
            config.transport.port = port;
        }
        if let Some(interface) = self.interface {
            config.transport.local_interface = interface;
        }
        if let Some(site) = self.site {
            config.identity.site_id = site;
        }
        if let Some(application) = self.application {
            config.identity.application_id = application;
        }
        if let Some(exercise) = self.exercise {
            config.identity.exercise_id = exercise;
        }
        if let Some(interval) = self.interval {
            config.tick_interval_secs = interval;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => FederateConfig::load(path)?,
        None => FederateConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    if args.monitor {
        return monitor::run(
            &config.transport,
            &config.identity,
            &config.catalog(),
            Duration::from_secs(args.duration),
        );
    }

    let track = ShipTrack::new(config.ship.clone());

    if args.dry_run {
        let clock = ManualClock::new(SystemTime::now());
        let transport = MemoryTransport::for_config(&config.transport);
        let log = transport.log();
        let mut session =
            DisSession::with_clock(config.identity, config.session_options(), clock.clone());
        session.open_with(transport)?;
        let driver = SimulationLoop::new(config.tick_interval(), clock);
        sail(&mut session, &driver, &track, &config, args.ticks)?;

        for datagram in log.datagrams() {
            let text = monitor::describe_datagram(
                &datagram.bytes,
                datagram.destination,
                &config.identity,
                session.codec().catalog(),
            );
            println!("{}", text);
        }
        return Ok(());
    }

    let mut session: DisSession<MulticastTransport> =
        DisSession::new(config.identity, config.session_options());
    session.open(&config.transport)?;
    let driver = SimulationLoop::new(config.tick_interval(), SystemClock);
    sail(&mut session, &driver, &track, &config, args.ticks)
}

fn sail<T, C, D>(
    session: &mut DisSession<T, C>,
    driver: &SimulationLoop<D>,
    track: &ShipTrack,
    config: &FederateConfig,
    ticks: u32,
) -> Result<()>
where
    T: DatagramTransport,
    C: Clock,
    D: Clock,
{
    let interval = config.tick_interval_secs;
    let report = driver.run(session, Some(ticks), |index| {
        (track.entity_id(), track.state_at(index as f64 * interval))
    });
    session.close()?;

    let stats = session.stats();
    log::info!(
        "{} ticks: {} sent, {} failed ({} PDUs, {} bytes in total)",
        report.ticks,
        report.sent,
        report.failed,
        stats.pdus_sent,
        stats.bytes_sent
    );
    Ok(())
}
