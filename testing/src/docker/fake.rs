use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::{ContainerRuntime, ContainerSpec, DockerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeContainer {
    pub id: String,
    pub spec: ContainerSpec,
    pub running: bool,
    pub networks: BTreeMap<String, String>,
}

#[derive(Default, Debug)]
struct FakeState {
    next_id: usize,
    containers: BTreeMap<String, FakeContainer>,
    networks: BTreeMap<String, String>,
    /// Names for which stop/remove calls fail with a generic error.
    failing: BTreeSet<String>,
    fail_run: bool,
    calls: Vec<String>,
}

/// In-memory runtime that mimics docker's naming and error semantics.
#[derive(Default, Debug)]
pub struct FakeRuntime {
    state: RefCell<FakeState>,
}

impl FakeRuntime {
    fn id(state: &mut FakeState, kind: &str) -> String {
        state.next_id += 1;
        format!("{kind}{:04}", state.next_id)
    }

    fn failed(command: String) -> DockerError {
        DockerError::Failed {
            command,
            stderr: "injected failure".to_owned(),
        }
    }

    pub fn add_container(&self, name: &str) {
        let mut state = self.state.borrow_mut();
        let id = Self::id(&mut state, "c");
        let spec = ContainerSpec {
            name: name.to_owned(),
            image: "leftover".to_owned(),
            args: Vec::new(),
            ports: Vec::new(),
        };
        state.containers.insert(
            name.to_owned(),
            FakeContainer {
                id,
                spec,
                running: true,
                networks: BTreeMap::new(),
            },
        );
    }

    pub fn add_network(&self, name: &str) {
        let mut state = self.state.borrow_mut();
        let id = Self::id(&mut state, "n");
        state.networks.insert(name.to_owned(), id);
    }

    pub fn fail_on(&self, name: &str) {
        self.state.borrow_mut().failing.insert(name.to_owned());
    }

    pub fn fail_run(&self, fail: bool) {
        self.state.borrow_mut().fail_run = fail;
    }

    pub fn container(&self, name: &str) -> Option<FakeContainer> {
        self.state.borrow().containers.get(name).cloned()
    }

    pub fn container_names(&self) -> Vec<String> {
        self.state.borrow().containers.keys().cloned().collect()
    }

    pub fn network_names(&self) -> Vec<String> {
        self.state.borrow().networks.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check_failing(&self, call: &str, name: &str) -> Result<(), DockerError> {
        if self.state.borrow().failing.contains(name) {
            return Err(Self::failed(call.to_owned()));
        }
        Ok(())
    }
}

impl ContainerRuntime for FakeRuntime {
    fn create_network(&self, name: &str, _subnet: &str, _gateway: &str) -> Result<String, DockerError> {
        self.record(format!("network create {name}"));
        let mut state = self.state.borrow_mut();
        if state.networks.contains_key(name) {
            return Err(DockerError::AlreadyExists(format!(
                "network with name {name} already exists"
            )));
        }
        let id = Self::id(&mut state, "n");
        state.networks.insert(name.to_owned(), id.clone());
        Ok(id)
    }

    fn inspect_network(&self, name: &str) -> Result<String, DockerError> {
        self.state
            .borrow()
            .networks
            .get(name)
            .cloned()
            .ok_or_else(|| DockerError::NotFound(format!("network {name} not found")))
    }

    fn remove_network(&self, name: &str) -> Result<(), DockerError> {
        let call = format!("network rm {name}");
        self.record(call.clone());
        self.check_failing(&call, name)?;
        self.state
            .borrow_mut()
            .networks
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DockerError::NotFound(format!("network {name} not found")))
    }

    fn list_networks(&self) -> Result<Vec<String>, DockerError> {
        Ok(self.network_names())
    }

    fn run_container(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        self.record(format!("run {}", spec.name));
        let mut state = self.state.borrow_mut();
        if state.fail_run {
            return Err(Self::failed(format!("run {}", spec.name)));
        }
        if state.containers.contains_key(&spec.name) {
            return Err(DockerError::AlreadyExists(format!(
                "the container name \"/{}\" is already in use",
                spec.name
            )));
        }
        let id = Self::id(&mut state, "c");
        state.containers.insert(
            spec.name.clone(),
            FakeContainer {
                id: id.clone(),
                spec: spec.clone(),
                running: true,
                networks: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn stop_container(&self, name: &str) -> Result<(), DockerError> {
        let call = format!("stop {name}");
        self.record(call.clone());
        self.check_failing(&call, name)?;
        let mut state = self.state.borrow_mut();
        let container = state
            .containers
            .get_mut(name)
            .ok_or_else(|| DockerError::NotFound(format!("No such container: {name}")))?;
        container.running = false;
        Ok(())
    }

    fn remove_container(&self, name: &str) -> Result<(), DockerError> {
        let call = format!("rm {name}");
        self.record(call.clone());
        self.check_failing(&call, name)?;
        self.state
            .borrow_mut()
            .containers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DockerError::NotFound(format!("No such container: {name}")))
    }

    fn list_containers(&self) -> Result<Vec<String>, DockerError> {
        Ok(self.container_names())
    }

    fn connect_network(&self, network: &str, container: &str, ip: &str) -> Result<(), DockerError> {
        self.record(format!("network connect {network} {container}"));
        let mut state = self.state.borrow_mut();
        if !state.networks.contains_key(network) {
            return Err(DockerError::NotFound(format!("network {network} not found")));
        }
        let container = state
            .containers
            .get_mut(container)
            .ok_or_else(|| DockerError::NotFound(format!("No such container: {container}")))?;
        if container.networks.contains_key(network) {
            return Err(DockerError::AlreadyExists(format!(
                "endpoint with name {} already exists in network {network}",
                container.spec.name
            )));
        }
        container.networks.insert(network.to_owned(), ip.to_owned());
        Ok(())
    }

    fn prune_images(&self) -> Result<String, DockerError> {
        self.record("image prune".to_owned());
        Ok("Total reclaimed space: 0B".to_owned())
    }
}
