mod exit_with_error;
pub use exit_with_error::exit_with_error;

pub mod codec;
pub mod logging;
pub mod poll;

pub mod docker;
pub mod node;

pub mod cluster;
use cluster::{Cluster, ClusterConfig};

pub mod scenarios;
use scenarios::{ScenarioTimeouts, Scenarios};

/// Runs `scenario` on a fresh cluster.
///
/// Leftovers of earlier sessions are swept first; everything the scenario
/// starts is torn down afterwards, whether it passed or not.
pub fn run_scenario(
    scenario: Scenarios,
    config: ClusterConfig,
    timeouts: ScenarioTimeouts,
) -> anyhow::Result<()> {
    let mut cluster = Cluster::new(config);
    let swept = cluster.sweep_orphans();
    if !swept.removed_containers.is_empty() || !swept.removed_networks.is_empty() {
        tracing::info!(
            "cleaned up {} container(s) and {} network(s) from a previous session",
            swept.removed_containers.len(),
            swept.removed_networks.len()
        );
    }

    let res = scenario.with_timeouts(timeouts).run(&mut cluster);
    let report = cluster.stop_all();
    if !report.is_clean() {
        tracing::warn!("{} teardown step(s) failed", report.errors.len());
    }
    res
}
