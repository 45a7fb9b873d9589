mod config;
pub use config::*;

mod teardown;
pub use teardown::{TeardownError, TeardownReport};

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::docker::{ContainerRuntime, ContainerSpec, DockerCli, DockerError};
use crate::node::{NodeClient, NodeClientError, NodeConfig};

#[derive(thiserror::Error, Debug)]
pub enum ClusterError {
    #[error("failed to create network `{name}`: {source}")]
    CreateNetwork { name: String, source: DockerError },
    #[error("failed to start node `{name}`: {source}")]
    StartNode { name: String, source: DockerError },
    #[error("node `{0}` is not running in this cluster")]
    UnknownNode(String),
    #[error(transparent)]
    Docker(#[from] DockerError),
    #[error(transparent)]
    Client(#[from] NodeClientError),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Absent,
    Starting,
    Running,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct TrackedNode {
    pub config: NodeConfig,
    pub container_id: Option<String>,
    pub state: NodeState,
}

/// Owns the nodes and networks of one test session.
///
/// Every container and network the cluster creates is removed by
/// [`Cluster::stop_all`], which also runs on drop, so a panicking scenario
/// still releases its resources.
pub struct Cluster<R: ContainerRuntime = DockerCli> {
    config: ClusterConfig,
    runtime: R,
    nodes: BTreeMap<String, TrackedNode>,
    /// Network name to id.
    networks: BTreeMap<String, String>,
}

impl Cluster<DockerCli> {
    pub fn new(config: ClusterConfig) -> Self {
        Self::with_runtime(config, DockerCli::default())
    }
}

impl<R: ContainerRuntime> Cluster<R> {
    pub fn with_runtime(config: ClusterConfig, runtime: R) -> Self {
        Self {
            config,
            runtime,
            nodes: BTreeMap::new(),
            networks: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn node(&self, name: &str) -> Option<&TrackedNode> {
        self.nodes.get(name)
    }

    pub fn node_state(&self, name: &str) -> NodeState {
        self.nodes.get(name).map_or(NodeState::Absent, |n| n.state)
    }

    pub fn running_nodes(&self) -> impl Iterator<Item = &TrackedNode> {
        self.nodes.values().filter(|n| n.state == NodeState::Running)
    }

    pub fn networks(&self) -> impl Iterator<Item = (&str, &str)> {
        self.networks.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Control-plane client for a node started by this cluster.
    pub fn client(&self, name: &str) -> Result<NodeClient, ClusterError> {
        let node = self
            .nodes
            .get(name)
            .filter(|n| n.state == NodeState::Running)
            .ok_or_else(|| ClusterError::UnknownNode(name.to_owned()))?;
        Ok(NodeClient::for_port(
            &self.config.rest_host,
            node.config.ports.rest,
            self.config.http_timeout,
        )?)
    }

    /// Creates a bridge network, adopting an existing one with the same name.
    pub fn create_network(
        &mut self,
        name: &str,
        subnet: &str,
        gateway: &str,
    ) -> Result<(), ClusterError> {
        let id = match self.runtime.create_network(name, subnet, gateway) {
            Ok(id) => {
                info!("created network: {name}");
                id
            }
            Err(err) if err.is_already_exists() => {
                let id = self
                    .runtime
                    .inspect_network(name)
                    .map_err(|source| ClusterError::CreateNetwork {
                        name: name.to_owned(),
                        source,
                    })?;
                info!("using existing network: {name}");
                id
            }
            Err(source) => {
                return Err(ClusterError::CreateNetwork {
                    name: name.to_owned(),
                    source,
                })
            }
        };
        self.networks.insert(name.to_owned(), id);
        Ok(())
    }

    /// Launches a fresh container for `node`, replacing any container with
    /// the same name, and waits for the node to settle.
    pub fn start_node(&mut self, node: &NodeConfig) -> Result<String, ClusterError> {
        let name = node.name.as_str();
        if !self.config.is_harness_container(name) {
            warn!(
                "node {name} doesn't start with `{}` and won't be caught by orphan sweeps",
                self.config.container_prefix
            );
        }

        match self.runtime.remove_container(name) {
            Ok(()) => info!("removed existing container: {name}"),
            Err(err) if err.is_not_found() => {}
            Err(err) => warn!("error cleaning up existing container {name}: {err}"),
        }
        self.nodes.remove(name);

        self.nodes.insert(
            name.to_owned(),
            TrackedNode {
                config: node.clone(),
                container_id: None,
                state: NodeState::Starting,
            },
        );

        let spec = ContainerSpec {
            name: name.to_owned(),
            image: self.config.image.clone(),
            args: node.node_args(&self.config.node_log_level),
            ports: node.port_mappings(),
        };
        let id = match self.runtime.run_container(&spec) {
            Ok(id) => id,
            Err(source) => {
                error!("failed to start container {name}: {source}");
                self.nodes.remove(name);
                return Err(ClusterError::StartNode {
                    name: name.to_owned(),
                    source,
                });
            }
        };

        if let Some(tracked) = self.nodes.get_mut(name) {
            tracked.container_id = Some(id.clone());
            tracked.state = NodeState::Running;
        }
        info!("started container: {name} ({id})");

        std::thread::sleep(self.config.node_settle_delay);
        Ok(id)
    }

    /// Attaches a running node to a network created by this cluster.
    ///
    /// Best effort: failures are logged and reported as `false`.
    pub fn connect_to_network(&mut self, name: &str, network: &str, ip: Ipv4Addr) -> bool {
        if self.node_state(name) != NodeState::Running {
            warn!("can't connect {name} to {network}: node is not running");
            return false;
        }
        if !self.networks.contains_key(network) {
            warn!("can't connect {name} to {network}: network is not tracked");
            return false;
        }
        match self.runtime.connect_network(network, name, &ip.to_string()) {
            Ok(()) => {
                info!("connected {name} to {network} with IP {ip}");
                true
            }
            Err(err) => {
                warn!("failed to connect {name} to network {network}: {err}");
                false
            }
        }
    }

    /// Stops and removes every tracked container and network, then sweeps
    /// whatever harness resources are left over.
    pub fn stop_all(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();

        for (name, node) in self.nodes.iter_mut() {
            if node.state == NodeState::Stopped {
                continue;
            }
            let target = format!("container {name}");
            let stopped = report.step(target.clone(), self.runtime.stop_container(name));
            let removed = report.step(target, self.runtime.remove_container(name));
            if stopped && removed {
                report.container_removed(name);
            }
            node.state = NodeState::Stopped;
        }

        for name in std::mem::take(&mut self.networks).into_keys() {
            if report.step(format!("network {name}"), self.runtime.remove_network(&name)) {
                report.network_removed(&name);
            }
        }

        report.merge(self.sweep_orphans());
        if !report.is_clean() {
            warn!("teardown finished with {} error(s)", report.errors.len());
        }
        report
    }

    /// Removes harness containers and networks this cluster doesn't track,
    /// e.g. ones left behind by a crashed session.
    pub fn sweep_orphans(&self) -> TeardownReport {
        let mut report = TeardownReport::default();

        match self.runtime.list_containers() {
            Ok(names) => {
                for name in names
                    .iter()
                    .filter(|name| self.config.is_harness_container(name))
                {
                    let target = format!("container {name}");
                    let stopped = report.step(target.clone(), self.runtime.stop_container(name));
                    let removed = report.step(target, self.runtime.remove_container(name));
                    if stopped && removed {
                        info!("cleaned up orphaned container: {name}");
                        report.container_removed(name);
                    }
                }
            }
            Err(err) => {
                report.step("orphaned containers".to_owned(), Err(err));
            }
        }

        match self.runtime.list_networks() {
            Ok(names) => {
                for name in names
                    .iter()
                    .filter(|name| self.config.sweep_networks.contains(name))
                {
                    if report.step(format!("network {name}"), self.runtime.remove_network(name)) {
                        report.network_removed(name);
                    }
                }
            }
            Err(err) => {
                report.step("orphaned networks".to_owned(), Err(err));
            }
        }

        report
    }

    pub fn prune_images(&self) -> Result<String, ClusterError> {
        let summary = self.runtime.prune_images()?;
        info!("pruned unused images: {summary}");
        Ok(summary)
    }

    fn needs_teardown(&self) -> bool {
        !self.networks.is_empty() || self.nodes.values().any(|n| n.state != NodeState::Stopped)
    }
}

impl<R: ContainerRuntime> Drop for Cluster<R> {
    fn drop(&mut self) {
        if self.needs_teardown() {
            self.stop_all();
        }
    }
}
