use tracing::{info, warn};

use crate::docker::DockerError;

#[derive(Debug)]
pub struct TeardownError {
    /// What was being removed, e.g. `container waku_node1`.
    pub target: String,
    pub error: DockerError,
}

/// Outcome of a teardown pass. Failures are collected, never returned early.
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub removed_containers: Vec<String>,
    pub removed_networks: Vec<String>,
    pub errors: Vec<TeardownError>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: TeardownReport) {
        self.removed_containers.extend(other.removed_containers);
        self.removed_networks.extend(other.removed_networks);
        self.errors.extend(other.errors);
    }

    /// Records the result of one teardown step. Missing targets count as
    /// already removed.
    pub(super) fn step(&mut self, target: String, res: Result<(), DockerError>) -> bool {
        match res {
            Ok(()) => true,
            Err(err) if err.is_not_found() => true,
            Err(error) => {
                warn!("error cleaning up {target}: {error}");
                self.errors.push(TeardownError { target, error });
                false
            }
        }
    }

    pub(super) fn container_removed(&mut self, name: &str) {
        info!("stopped and removed container: {name}");
        self.removed_containers.push(name.to_owned());
    }

    pub(super) fn network_removed(&mut self, name: &str) {
        info!("removed network: {name}");
        self.removed_networks.push(name.to_owned());
    }
}
