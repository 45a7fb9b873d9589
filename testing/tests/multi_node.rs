use nwaku_testing::scenarios::multi_node::discovery_relay::MultiNodeDiscoveryRelay;

mod common;

scenario_test!(
    discovery_relay,
    MultiNodeDiscoveryRelay,
    MultiNodeDiscoveryRelay::default()
);
