use std::ffi::OsStr;
use std::process::Command;

use tracing::trace;

use super::{ContainerRuntime, ContainerSpec, DockerError};

/// [`ContainerRuntime`] backed by the `docker` command line client.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            program: "docker".to_owned(),
        }
    }
}

impl DockerCli {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn exec<I, S>(&self, args: I) -> Result<String, DockerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        let command = format!("{cmd:?}");
        trace!("exec: {command}");

        let output = cmd.output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
        } else {
            Err(DockerError::from_stderr(
                command,
                &String::from_utf8_lossy(&output.stderr),
            ))
        }
    }

    fn exec_lines<I, S>(&self, args: I) -> Result<Vec<String>, DockerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Ok(self
            .exec(args)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect())
    }

    pub fn run_args(spec: &ContainerSpec) -> Vec<String> {
        let mut args = vec![
            "run".to_owned(),
            "--detach".to_owned(),
            "--name".to_owned(),
            spec.name.clone(),
        ];
        for port in &spec.ports {
            args.push("-p".to_owned());
            args.push(format!(
                "{}:{}/{}",
                port.host,
                port.container,
                port.protocol.as_str()
            ));
        }
        args.push(spec.image.clone());
        args.extend(spec.args.iter().cloned());
        args
    }
}

impl ContainerRuntime for DockerCli {
    fn create_network(&self, name: &str, subnet: &str, gateway: &str) -> Result<String, DockerError> {
        self.exec([
            "network", "create", "--driver", "bridge", "--subnet", subnet, "--gateway", gateway,
            name,
        ])
    }

    fn inspect_network(&self, name: &str) -> Result<String, DockerError> {
        self.exec(["network", "inspect", "--format", "{{.Id}}", name])
    }

    fn remove_network(&self, name: &str) -> Result<(), DockerError> {
        self.exec(["network", "rm", name]).map(|_| ())
    }

    fn list_networks(&self) -> Result<Vec<String>, DockerError> {
        self.exec_lines(["network", "ls", "--format", "{{.Name}}"])
    }

    fn run_container(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        self.exec(Self::run_args(spec))
    }

    fn stop_container(&self, name: &str) -> Result<(), DockerError> {
        self.exec(["stop", name]).map(|_| ())
    }

    fn remove_container(&self, name: &str) -> Result<(), DockerError> {
        self.exec(["rm", "--force", name]).map(|_| ())
    }

    fn list_containers(&self) -> Result<Vec<String>, DockerError> {
        self.exec_lines(["ps", "--all", "--format", "{{.Names}}"])
    }

    fn connect_network(&self, network: &str, container: &str, ip: &str) -> Result<(), DockerError> {
        self.exec(["network", "connect", "--ip", ip, network, container])
            .map(|_| ())
    }

    fn prune_images(&self) -> Result<String, DockerError> {
        self.exec(["image", "prune", "--force"])
    }
}
