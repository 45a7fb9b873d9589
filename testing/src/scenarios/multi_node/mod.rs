pub mod discovery_relay;
