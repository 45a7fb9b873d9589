use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::node::DEFAULT_HTTP_TIMEOUT;

pub const DEFAULT_IMAGE: &str = "wakuorg/nwaku:v0.24.0";
pub const DEFAULT_CONTAINER_PREFIX: &str = "waku_node";
/// How long a freshly launched nwaku container needs to bind its listeners.
/// Measured, not derived.
pub const NODE_SETTLE_DELAY: Duration = Duration::from_secs(15);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    pub image: String,
    /// Containers whose name starts with this are considered owned by the
    /// harness and removed by orphan sweeps.
    pub container_prefix: String,
    /// Networks removed by orphan sweeps, tracked or not.
    pub sweep_networks: Vec<String>,
    pub node_settle_delay: Duration,
    /// Host the nodes' REST ports are published on.
    pub rest_host: String,
    pub http_timeout: Duration,
    pub node_log_level: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_owned(),
            container_prefix: DEFAULT_CONTAINER_PREFIX.to_owned(),
            sweep_networks: vec!["waku".to_owned()],
            node_settle_delay: NODE_SETTLE_DELAY,
            rest_host: "127.0.0.1".to_owned(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            node_log_level: "INFO".to_owned(),
        }
    }
}

impl ClusterConfig {
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn node_settle_delay(mut self, delay: Duration) -> Self {
        self.node_settle_delay = delay;
        self
    }

    pub fn node_log_level(mut self, level: impl Into<String>) -> Self {
        self.node_log_level = level.into();
        self
    }

    pub fn is_harness_container(&self, name: &str) -> bool {
        name.starts_with(&self.container_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: ClusterConfig =
            serde_json::from_str(r#"{ "image": "wakuorg/nwaku:v0.25.0" }"#).unwrap();
        assert_eq!(config.image, "wakuorg/nwaku:v0.25.0");
        assert_eq!(config.node_settle_delay, NODE_SETTLE_DELAY);
        assert_eq!(config.sweep_networks, ["waku"]);
        assert!(config.is_harness_container("waku_node2"));
        assert!(!config.is_harness_container("postgres"));
    }
}
