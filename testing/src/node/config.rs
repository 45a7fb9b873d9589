use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePorts {
    /// Control-plane (REST) port.
    pub rest: u16,
    pub tcp: u16,
    pub websocket: u16,
    pub discv5: u16,
    pub rpc: u16,
}

impl NodePorts {
    /// Five consecutive ports starting at `base`, in the order
    /// rest, tcp, websocket, discv5, rpc.
    pub const fn consecutive(base: u16) -> Self {
        Self {
            rest: base,
            tcp: base + 1,
            websocket: base + 2,
            discv5: base + 3,
            rpc: base + 4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortProtocol {
    Tcp,
    Udp,
}

impl PortProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
    pub protocol: PortProtocol,
}

impl PortMapping {
    const fn same(port: u16, protocol: PortProtocol) -> Self {
        Self {
            host: port,
            container: port,
            protocol,
        }
    }
}

/// Everything needed to launch one nwaku node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Container name. Must carry the cluster's container prefix to be
    /// picked up by orphan sweeps.
    pub name: String,
    pub ports: NodePorts,
    /// NAT hint advertised to peers; also the address used when the node is
    /// attached to the cluster network.
    pub external_ip: Ipv4Addr,
    /// Discovery record (ENR) of a node to bootstrap discv5 from.
    #[serde(default)]
    pub bootstrap: Option<String>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>, ports: NodePorts, external_ip: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            ports,
            external_ip,
            bootstrap: None,
        }
    }

    pub fn node1() -> Self {
        Self::new(
            "waku_node1",
            NodePorts::consecutive(21161),
            Ipv4Addr::new(172, 18, 111, 226),
        )
    }

    pub fn node2() -> Self {
        Self::new(
            "waku_node2",
            NodePorts::consecutive(21171),
            Ipv4Addr::new(172, 18, 111, 227),
        )
    }

    pub fn bootstrap(mut self, discovery_record: impl Into<String>) -> Self {
        self.bootstrap = Some(discovery_record.into());
        self
    }

    /// Command line passed to the nwaku binary inside the container.
    pub fn node_args(&self, log_level: &str) -> Vec<String> {
        let ports = &self.ports;
        let mut args = vec![
            "--listen-address=0.0.0.0".to_owned(),
            "--rest=true".to_owned(),
            "--rest-admin=true".to_owned(),
            "--websocket-support=true".to_owned(),
            format!("--log-level={log_level}"),
            "--rest-relay-cache-capacity=100".to_owned(),
            format!("--websocket-port={}", ports.websocket),
            format!("--rest-port={}", ports.rest),
            format!("--tcp-port={}", ports.tcp),
            format!("--discv5-udp-port={}", ports.discv5),
            "--rest-address=0.0.0.0".to_owned(),
            format!("--nat=extip:{}", self.external_ip),
            "--peer-exchange=true".to_owned(),
            "--discv5-discovery=true".to_owned(),
            "--relay=true".to_owned(),
        ];
        if let Some(enr) = self.bootstrap.as_ref().filter(|enr| !enr.is_empty()) {
            args.push(format!("--discv5-bootstrap-node={enr}"));
        }
        args
    }

    pub fn port_mappings(&self) -> Vec<PortMapping> {
        let ports = &self.ports;
        vec![
            PortMapping::same(ports.rest, PortProtocol::Tcp),
            PortMapping::same(ports.tcp, PortProtocol::Tcp),
            PortMapping::same(ports.websocket, PortProtocol::Tcp),
            PortMapping::same(ports.discv5, PortProtocol::Udp),
            PortMapping::same(ports.rpc, PortProtocol::Tcp),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub subnet: String,
    pub gateway: String,
}

impl NetworkConfig {
    pub fn waku() -> Self {
        Self {
            name: "waku".to_owned(),
            subnet: "172.18.0.0/16".to_owned(),
            gateway: "172.18.0.1".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_args_without_bootstrap() {
        let args = NodeConfig::node1().node_args("INFO");
        assert!(args.contains(&"--rest-port=21161".to_owned()));
        assert!(args.contains(&"--tcp-port=21162".to_owned()));
        assert!(args.contains(&"--websocket-port=21163".to_owned()));
        assert!(args.contains(&"--discv5-udp-port=21164".to_owned()));
        assert!(args.contains(&"--nat=extip:172.18.111.226".to_owned()));
        assert!(args.contains(&"--relay=true".to_owned()));
        assert!(args.contains(&"--log-level=INFO".to_owned()));
        assert!(!args.iter().any(|a| a.starts_with("--discv5-bootstrap-node")));
    }

    #[test]
    fn node_args_with_bootstrap() {
        let args = NodeConfig::node2().bootstrap("enr:-abc").node_args("DEBUG");
        assert_eq!(args.last().unwrap(), "--discv5-bootstrap-node=enr:-abc");

        // an empty record is not a bootstrap peer
        let args = NodeConfig::node2().bootstrap("").node_args("DEBUG");
        assert!(!args.iter().any(|a| a.starts_with("--discv5-bootstrap-node")));
    }

    #[test]
    fn discv5_is_published_over_udp() {
        let mappings = NodeConfig::node2().port_mappings();
        assert_eq!(mappings.len(), 5);
        let udp = mappings
            .iter()
            .filter(|m| m.protocol == PortProtocol::Udp)
            .collect::<Vec<_>>();
        assert_eq!(udp.len(), 1);
        assert_eq!(udp[0].host, 21174);
    }
}
