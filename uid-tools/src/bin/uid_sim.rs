//! Device simulator: answers probes read from stdin on stdout

use clap::{Parser, ValueEnum};
use tokio::sync::broadcast;
use tracing::warn;
use uid_protocol::{CollisionStrategy, Uid};
use uid_sim::{run_simulator_task, DeviceSet, DeviceSimulator, SimulatorConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollisionArg {
    /// Answer collisions with an empty line
    Empty,
    /// Answer collisions with symbols sampled from the matching UIDs
    Sample,
}

impl From<CollisionArg> for CollisionStrategy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Empty => CollisionStrategy::Empty,
            CollisionArg::Sample => CollisionStrategy::Sample,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "uid-sim", version, about = "Simulate bus devices answering UID discovery probes")]
struct Cli {
    /// UIDs of the simulated devices
    #[arg(required = true)]
    uids: Vec<String>,

    /// How collisions are rendered
    #[arg(long, value_enum, default_value_t = CollisionArg::Empty)]
    collision: CollisionArg,

    /// Seed for sampled collisions
    #[arg(long)]
    seed: Option<u64>,

    /// Vendor prefix that always collides with an empty line (repeatable)
    #[arg(long = "empty-collision-prefix", value_name = "PREFIX")]
    empty_collision_prefixes: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli: Cli = uid_tools::parse_args();
    uid_tools::init_tracing();

    for uid in &cli.uids {
        if let Err(e) = Uid::parse(uid) {
            warn!("{} is not a well-formed UID ({}); simulating it anyway", uid, e);
        }
    }

    let config = SimulatorConfig {
        collision: cli.collision.into(),
        empty_collision_prefixes: cli.empty_collision_prefixes,
        seed: cli.seed,
    };
    let simulator = DeviceSimulator::from_config(DeviceSet::new(cli.uids), config)?;

    // Nobody subscribes here; events only matter to embedders
    let (event_tx, _) = broadcast::channel(16);
    run_simulator_task(tokio::io::stdin(), tokio::io::stdout(), simulator, event_tx).await?;
    Ok(())
}
