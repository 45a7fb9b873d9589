use anyhow::{bail, ensure, Context};
use tracing::{error, info};

use crate::cluster::Cluster;
use crate::docker::ContainerRuntime;
use crate::node::{NetworkConfig, NodeClient, NodeConfig};
use crate::poll;
use crate::scenarios::{ScenarioTimeouts, TEST_TOPIC};

pub const INTER_NODE_MESSAGE: &str = "Inter-node communication test message";

/// Create the `waku` docker network.
/// Start the first node, attach it to the network and read its ENR.
/// Start a second node bootstrapping discv5 from that ENR.
/// Wait until both nodes report at least one connected peer.
/// Subscribe both nodes to the same content topic, publish from the first
/// node and check the message reaches the second.
/// Fail on any timeout.
#[derive(documented::Documented, Default, Clone, Copy, Debug)]
pub struct MultiNodeDiscoveryRelay {
    pub timeouts: ScenarioTimeouts,
}

impl MultiNodeDiscoveryRelay {
    pub fn run<R: ContainerRuntime>(self, cluster: &mut Cluster<R>) -> anyhow::Result<()> {
        let timeouts = self.timeouts;
        let network = NetworkConfig::waku();
        cluster.create_network(&network.name, &network.subnet, &network.gateway)?;

        let node1 = NodeConfig::node1();
        cluster.start_node(&node1)?;
        cluster.connect_to_network(&node1.name, &network.name, node1.external_ip);
        let client1 = cluster.client(&node1.name)?;

        client1
            .get_debug_info()
            .with_context(|| format!("{} is not reachable", node1.name))?;
        let enr = client1
            .await_discovery_record(timeouts.node_ready, timeouts.ready_poll_interval)
            .with_context(|| format!("{} never reported an ENR", node1.name))?;
        info!("node1 ENR: {enr}");
        ensure!(client1.subscribe(&[TEST_TOPIC]), "failed to subscribe node1 to topic");

        let node2 = NodeConfig::node2().bootstrap(enr);
        cluster.start_node(&node2)?;
        cluster.connect_to_network(&node2.name, &network.name, node2.external_ip);
        let client2 = cluster.client(&node2.name)?;

        let mut attempt = 0;
        let connected = poll::wait_for_condition(
            timeouts.peer_connection,
            timeouts.peer_poll_interval,
            || {
                attempt += 1;
                let peers1 = client1.list_peers().len();
                let peers2 = client2.list_peers().len();
                info!("attempt {attempt}: node1 peers: {peers1}, node2 peers: {peers2}");
                peers1 >= 1 && peers2 >= 1
            },
        );
        if !connected {
            error!("nodes failed to connect, checking debug info...");
            log_debug_info("node1", &client1);
            log_debug_info("node2", &client2);
            bail!(
                "nodes failed to connect to each other within {:?}",
                timeouts.peer_connection
            );
        }

        ensure!(client2.subscribe(&[TEST_TOPIC]), "failed to subscribe node2 to topic");
        std::thread::sleep(timeouts.subscription_propagation);

        ensure!(
            client1.publish(TEST_TOPIC, INTER_NODE_MESSAGE, None),
            "failed to publish message from node1"
        );

        let received = client2.await_message(
            TEST_TOPIC,
            INTER_NODE_MESSAGE,
            timeouts.message_propagation,
            timeouts.message_poll_interval,
        );
        if received.is_none() {
            let held = client1.fetch_messages(TEST_TOPIC).len();
            info!("node1 has {held} messages");
            bail!(
                "test message not received by node2 within {:?}",
                timeouts.message_propagation
            );
        }
        info!("node2 received the message from node1");
        Ok(())
    }
}

fn log_debug_info(label: &str, client: &NodeClient) {
    match client.get_debug_info() {
        Ok(info) => error!("{label} info: {info:?}"),
        Err(err) => error!("failed to get {label} debug info: {err}"),
    }
}
