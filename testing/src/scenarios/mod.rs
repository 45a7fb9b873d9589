//! End-to-end scenarios against real nwaku containers.
//!
//! Solo node:
//! * A single node relays a message to itself over a content topic.
//! Multi node:
//! * A second node discovers the first through its ENR, and a message
//!   published on one is delivered to the other.

pub mod multi_node;
pub mod solo_node;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::cluster::Cluster;
use crate::docker::ContainerRuntime;

use self::multi_node::discovery_relay::MultiNodeDiscoveryRelay;
use self::solo_node::relay::SoloNodeRelay;

pub const TEST_TOPIC: &str = "/my-app/2/chatroom-1/proto";
pub const TEST_MESSAGE: &str = "Relay works!!";

/// Waits used by scenarios. Defaults are what nwaku needs in practice on a
/// local docker host.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ScenarioTimeouts {
    /// Until a started node serves its discovery record.
    pub node_ready: Duration,
    pub ready_poll_interval: Duration,
    /// Until every node reports at least one connected peer.
    pub peer_connection: Duration,
    pub peer_poll_interval: Duration,
    /// Pause after subscribing so the subscription reaches the mesh.
    pub subscription_propagation: Duration,
    /// Until a published message shows up on the receiving node.
    pub message_propagation: Duration,
    pub message_poll_interval: Duration,
}

impl Default for ScenarioTimeouts {
    fn default() -> Self {
        Self {
            node_ready: Duration::from_secs(60),
            ready_poll_interval: Duration::from_secs(2),
            peer_connection: Duration::from_secs(120),
            peer_poll_interval: Duration::from_secs(10),
            subscription_propagation: Duration::from_secs(10),
            message_propagation: Duration::from_secs(15),
            message_poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(EnumIter, EnumString, IntoStaticStr, derive_more::From, Clone, Copy, Debug)]
#[strum(serialize_all = "kebab-case")]
pub enum Scenarios {
    SoloNodeRelay(SoloNodeRelay),
    MultiNodeDiscoveryRelay(MultiNodeDiscoveryRelay),
}

impl Scenarios {
    pub fn iter() -> impl Iterator<Item = Scenarios> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn to_str(self) -> &'static str {
        self.into()
    }

    pub fn description(self) -> &'static str {
        use documented::Documented;
        match self {
            Self::SoloNodeRelay(_) => SoloNodeRelay::DOCS,
            Self::MultiNodeDiscoveryRelay(_) => MultiNodeDiscoveryRelay::DOCS,
        }
    }

    pub fn with_timeouts(self, timeouts: ScenarioTimeouts) -> Self {
        match self {
            Self::SoloNodeRelay(_) => SoloNodeRelay { timeouts }.into(),
            Self::MultiNodeDiscoveryRelay(_) => MultiNodeDiscoveryRelay { timeouts }.into(),
        }
    }

    pub fn run<R: ContainerRuntime>(self, cluster: &mut Cluster<R>) -> anyhow::Result<()> {
        tracing::info!("running scenario: {}", self.to_str());
        match self {
            Self::SoloNodeRelay(v) => v.run(cluster),
            Self::MultiNodeDiscoveryRelay(v) => v.run(cluster),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenarios_are_addressable_by_name() {
        let names = Scenarios::iter().map(Scenarios::to_str).collect::<Vec<_>>();
        assert_eq!(names, ["solo-node-relay", "multi-node-discovery-relay"]);

        let scenario: Scenarios = "multi-node-discovery-relay".parse().unwrap();
        assert!(matches!(scenario, Scenarios::MultiNodeDiscoveryRelay(_)));
        assert!("no-such-scenario".parse::<Scenarios>().is_err());
    }

    #[test]
    fn every_scenario_is_documented() {
        for scenario in Scenarios::iter() {
            assert!(!scenario.description().trim().is_empty());
        }
    }

    #[test]
    fn timeouts_override() {
        let timeouts = ScenarioTimeouts {
            message_propagation: Duration::from_secs(30),
            ..Default::default()
        };
        let Scenarios::SoloNodeRelay(scenario) = Scenarios::SoloNodeRelay(Default::default())
            .with_timeouts(timeouts)
        else {
            panic!("variant changed");
        };
        assert_eq!(scenario.timeouts.message_propagation, Duration::from_secs(30));
        assert_eq!(scenario.timeouts.peer_connection, Duration::from_secs(120));
    }
}
