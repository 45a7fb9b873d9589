use anyhow::{ensure, Context};
use tracing::info;

use crate::cluster::Cluster;
use crate::docker::ContainerRuntime;
use crate::node::NodeConfig;
use crate::scenarios::{ScenarioTimeouts, TEST_MESSAGE, TEST_TOPIC};

/// Start a single nwaku node with relay enabled.
/// Check that its REST API serves debug info with an ENR.
/// Subscribe to the test content topic and publish a message on it.
/// Poll the node's relay cache until the message comes back with the
/// exact same payload.
#[derive(documented::Documented, Default, Clone, Copy, Debug)]
pub struct SoloNodeRelay {
    pub timeouts: ScenarioTimeouts,
}

impl SoloNodeRelay {
    pub fn run<R: ContainerRuntime>(self, cluster: &mut Cluster<R>) -> anyhow::Result<()> {
        let timeouts = self.timeouts;
        let node = NodeConfig::node1();

        cluster.start_node(&node)?;
        let client = cluster.client(&node.name)?;

        client
            .get_debug_info()
            .with_context(|| format!("{} is not reachable", node.name))?;
        let enr = client
            .await_discovery_record(timeouts.node_ready, timeouts.ready_poll_interval)
            .with_context(|| format!("{} never reported an ENR", node.name))?;
        info!("node ENR URI: {enr}");

        ensure!(client.subscribe(&[TEST_TOPIC]), "failed to subscribe to topic");
        ensure!(
            client.publish(TEST_TOPIC, TEST_MESSAGE, None),
            "failed to publish message"
        );

        client
            .await_message(
                TEST_TOPIC,
                TEST_MESSAGE,
                timeouts.message_propagation,
                timeouts.message_poll_interval,
            )
            .with_context(|| {
                format!("published message '{TEST_MESSAGE}' not found in retrieved messages")
            })?;
        info!("message relayed by {}", node.name);
        Ok(())
    }
}
