use std::path::PathBuf;
use std::thread::sleep;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use elevator_dispatch::{
    init_logging, BuildingConfig, Direction, ElevatorEvent, FleetError, FleetHandle, PolicyKind,
};

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - elevator fleet demo");
const RUN_LIMIT: Duration = Duration::from_secs(120);

#[derive(Debug, Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about = PKG_DESCRIPTION)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of elevators in the fleet
    #[arg(short = 'n', long = "elevators")]
    elevators: Option<usize>,
    /// Hall call dispatch policy
    #[arg(short = 'p', long = "policy", value_enum)]
    policy: Option<PolicyArg>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    NearestIdle,
    DirectionAware,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::NearestIdle => PolicyKind::NearestIdle,
            PolicyArg::DirectionAware => PolicyKind::DirectionAware,
        }
    }
}

fn load_config(cli: &Cli) -> Result<(BuildingConfig, Option<PathBuf>), FleetError> {
    let (mut config, path) = match &cli.config {
        Some(path) => (BuildingConfig::load_from_file(path)?, Some(path.clone())),
        None => BuildingConfig::load_from_default_paths()?,
    };
    if let Some(elevators) = cli.elevators {
        config.elevators = elevators;
    }
    if let Some(policy) = cli.policy {
        config.policy = policy.into();
    }
    if cli.log_level.is_some() {
        config.log_level = cli.log_level.clone();
    }
    config.validate()?;
    Ok((config, path))
}

fn main() -> Result<(), FleetError> {
    let cli = Cli::parse();
    let (config, path) = load_config(&cli)?;
    init_logging(config.log_level.as_deref());
    match path {
        Some(path) => info!("loaded config from {}", path.display()),
        None => info!("no config file found, using defaults"),
    }

    let fleet = FleetHandle::from_config(&config)?;
    let events = fleet.subscribe();

    // people pressing buttons on landings
    fleet.request_hall(3, Direction::Up);
    fleet.request_hall(5, Direction::Down);
    fleet.request_hall(1, Direction::Up);

    // let the cars get going, then press buttons inside car 1
    sleep(config.timing().floor_travel * 4);
    fleet.request_cab(1, 7);
    fleet.request_cab(1, 0);

    let started = Instant::now();
    while started.elapsed() < RUN_LIMIT {
        match events.recv_timeout(Duration::from_secs(1)) {
            Ok(ElevatorEvent::Idle { .. }) | Err(_) if fleet.is_idle() => break,
            Ok(event) => info!("{:?}", event),
            Err(_) => {}
        }
    }
    if !fleet.is_idle() {
        warn!("fleet still busy after {:?}", RUN_LIMIT);
    }

    for status in fleet.statuses() {
        println!(
            "Elevator:{} floor:{} state:{} pending:{}",
            status.id, status.floor, status.state, status.pending
        );
    }
    fleet.shutdown();
    Ok(())
}
