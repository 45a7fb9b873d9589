use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use nwaku_testing::cluster::{Cluster, ClusterConfig, DEFAULT_IMAGE};
use nwaku_testing::logging::{self, Level, DEFAULT_LOG_FILE};
use nwaku_testing::scenarios::{ScenarioTimeouts, Scenarios};
use nwaku_testing::{exit_with_error, run_scenario};

pub type CommandError = anyhow::Error;

#[derive(Debug, clap::Parser)]
#[command(name = "nwaku-testing", about = "nwaku end-to-end testing cli")]
pub struct NwakuTestingCli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Args)]
pub struct LogArgs {
    #[arg(long, short, global = true, env = "NWAKU_TESTING_VERBOSITY", default_value = "info")]
    pub verbosity: Level,

    /// Diagnostic log, appended to across sessions.
    #[arg(long, global = true, env = "NWAKU_TESTING_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// List available scenarios.
    ScenariosList,
    /// Run a scenario against fresh nwaku containers.
    ScenarioRun(CommandScenarioRun),
    /// Remove containers and networks left behind by the harness.
    Cleanup(CommandCleanup),
}

#[derive(Debug, clap::Args)]
pub struct CommandScenarioRun {
    /// Scenario name, as printed by `scenarios-list`.
    pub name: String,

    #[arg(long, env = "NWAKU_IMAGE", default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// Pause after launching each node.
    #[arg(long, env = "NWAKU_SETTLE_DELAY_SECS", default_value = "15")]
    pub settle_delay_secs: u64,

    /// Log level passed to the nodes.
    #[arg(long, env = "NWAKU_NODE_LOG_LEVEL", default_value = "INFO")]
    pub node_log_level: String,

    #[arg(long, env = "NWAKU_PEER_TIMEOUT_SECS", default_value = "120")]
    pub peer_timeout_secs: u64,

    #[arg(long, env = "NWAKU_MESSAGE_TIMEOUT_SECS", default_value = "15")]
    pub message_timeout_secs: u64,
}

#[derive(Debug, clap::Args)]
pub struct CommandCleanup {
    /// Also remove dangling images.
    #[arg(long)]
    pub prune_images: bool,
}

impl Command {
    pub fn run(self) -> Result<(), CommandError> {
        match self {
            Self::ScenariosList => {
                for scenario in Scenarios::iter() {
                    println!("{}", scenario.to_str());
                    for line in scenario.description().lines() {
                        println!("    {}", line.trim());
                    }
                }
                Ok(())
            }
            Self::ScenarioRun(args) => {
                let scenario = args
                    .name
                    .parse::<Scenarios>()
                    .map_err(|_| anyhow::anyhow!("unknown scenario: {}", args.name))?;
                let config = ClusterConfig::default()
                    .image(args.image)
                    .node_settle_delay(Duration::from_secs(args.settle_delay_secs))
                    .node_log_level(args.node_log_level);
                let timeouts = ScenarioTimeouts {
                    peer_connection: Duration::from_secs(args.peer_timeout_secs),
                    message_propagation: Duration::from_secs(args.message_timeout_secs),
                    ..Default::default()
                };
                run_scenario(scenario, config, timeouts)?;
                println!("scenario {} passed", scenario.to_str());
                Ok(())
            }
            Self::Cleanup(args) => {
                println!("cleaning up nwaku test resources...");
                let cluster = Cluster::new(ClusterConfig::default());
                let report = cluster.sweep_orphans();
                println!("removed {} containers", report.removed_containers.len());
                println!("removed {} networks", report.removed_networks.len());
                for err in &report.errors {
                    println!("error removing {}: {}", err.target, err.error);
                }
                if args.prune_images {
                    match cluster.prune_images() {
                        Ok(summary) => println!("pruned unused images: {summary}"),
                        Err(err) => println!("error pruning images: {err}"),
                    }
                }
                println!("cleanup completed!");
                Ok(())
            }
        }
    }
}

pub fn main() {
    let cli = NwakuTestingCli::parse();
    if let Err(err) = logging::initialize(cli.log.verbosity, Some(&cli.log.log_file)) {
        exit_with_error(err);
    }
    match cli.command.run() {
        Ok(_) => {}
        Err(err) => exit_with_error(err),
    }
}
