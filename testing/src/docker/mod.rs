//! Container runtime used to host nodes under test.

mod cli;
pub use cli::DockerCli;

#[cfg(test)]
pub(crate) mod fake;

use serde::{Deserialize, Serialize};

use crate::node::PortMapping;

#[derive(thiserror::Error, Debug)]
pub enum DockerError {
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    NotFound(String),
    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("failed to execute docker: {0}")]
    Io(#[from] std::io::Error),
}

impl DockerError {
    /// Classifies a failed docker command by its stderr.
    pub fn from_stderr(command: String, stderr: &str) -> Self {
        let stderr = stderr.trim().to_owned();
        let lower = stderr.to_lowercase();
        if lower.contains("already exists") || lower.contains("is already in use") {
            Self::AlreadyExists(stderr)
        } else if lower.contains("no such container")
            || lower.contains("no such network")
            || lower.contains("no such object")
            || lower.contains("not found")
        {
            Self::NotFound(stderr)
        } else {
            Self::Failed { command, stderr }
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub args: Vec<String>,
    pub ports: Vec<PortMapping>,
}

/// Operations the cluster needs from a container runtime.
///
/// Containers and networks are addressed by name. Creating something that
/// exists must fail with [`DockerError::AlreadyExists`], and touching
/// something missing must fail with [`DockerError::NotFound`], so callers
/// can treat those as success where the operation is idempotent.
pub trait ContainerRuntime {
    /// Creates a bridge network, returning its id.
    fn create_network(&self, name: &str, subnet: &str, gateway: &str) -> Result<String, DockerError>;
    /// Id of an existing network.
    fn inspect_network(&self, name: &str) -> Result<String, DockerError>;
    fn remove_network(&self, name: &str) -> Result<(), DockerError>;
    fn list_networks(&self) -> Result<Vec<String>, DockerError>;

    /// Starts a detached container, returning its id.
    fn run_container(&self, spec: &ContainerSpec) -> Result<String, DockerError>;
    fn stop_container(&self, name: &str) -> Result<(), DockerError>;
    /// Removes a container, killing it first if it is still running.
    fn remove_container(&self, name: &str) -> Result<(), DockerError>;
    /// Names of all containers, running or not.
    fn list_containers(&self) -> Result<Vec<String>, DockerError>;

    fn connect_network(&self, network: &str, container: &str, ip: &str) -> Result<(), DockerError>;

    /// Removes dangling images, returning the runtime's summary.
    fn prune_images(&self) -> Result<String, DockerError>;
}

impl<R: ContainerRuntime + ?Sized> ContainerRuntime for &R {
    fn create_network(&self, name: &str, subnet: &str, gateway: &str) -> Result<String, DockerError> {
        (**self).create_network(name, subnet, gateway)
    }

    fn inspect_network(&self, name: &str) -> Result<String, DockerError> {
        (**self).inspect_network(name)
    }

    fn remove_network(&self, name: &str) -> Result<(), DockerError> {
        (**self).remove_network(name)
    }

    fn list_networks(&self) -> Result<Vec<String>, DockerError> {
        (**self).list_networks()
    }

    fn run_container(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        (**self).run_container(spec)
    }

    fn stop_container(&self, name: &str) -> Result<(), DockerError> {
        (**self).stop_container(name)
    }

    fn remove_container(&self, name: &str) -> Result<(), DockerError> {
        (**self).remove_container(name)
    }

    fn list_containers(&self) -> Result<Vec<String>, DockerError> {
        (**self).list_containers()
    }

    fn connect_network(&self, network: &str, container: &str, ip: &str) -> Result<(), DockerError> {
        (**self).connect_network(network, container, ip)
    }

    fn prune_images(&self) -> Result<String, DockerError> {
        (**self).prune_images()
    }
}
