//! Deployment refresh through a container runtime CLI
//!
//! A refresh is two commands run in order: pull the release image, then
//! re-apply the compose descriptor so the running service converges on it.
//! Neither command has a timeout.

pub mod runtime;

pub use runtime::ContainerRuntime;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Errors raised while refreshing the deployment
#[derive(Error, Debug)]
pub enum DeployError {
    /// Unknown container runtime name
    #[error("Unknown container runtime '{name}'. Expected 'docker' or 'podman'.")]
    UnknownRuntime { name: String },

    /// The runtime binary could not be started
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The runtime exited with a non-zero status
    #[error("Command '{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

pub type DeployResult<T> = Result<T, DeployError>;

/// Applies a new release to the running service.
#[async_trait]
pub trait DeploymentRunner: Send + Sync {
    /// Pull `image_reference` (`<image>:<tag>`).
    async fn pull_image(&self, image_reference: &str) -> DeployResult<()>;

    /// Re-apply the compose descriptor at `descriptor` in detached mode.
    async fn compose_up(&self, descriptor: &Path) -> DeployResult<()>;
}

/// [`DeploymentRunner`] that shells out to a container runtime CLI.
#[derive(Debug, Clone)]
pub struct CliDeploymentRunner {
    program: String,
}

impl CliDeploymentRunner {
    pub fn new(runtime: ContainerRuntime) -> Self {
        Self::with_program(runtime.command())
    }

    /// Use an arbitrary executable that accepts the runtime's arguments.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[&str]) -> DeployResult<()> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(command = %command, "Running container runtime command");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| DeployError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(
                command = %command,
                status = %output.status,
                stderr = %stderr,
                "Container runtime command failed"
            );
            return Err(DeployError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}

impl Default for CliDeploymentRunner {
    fn default() -> Self {
        Self::new(ContainerRuntime::default())
    }
}

#[async_trait]
impl DeploymentRunner for CliDeploymentRunner {
    async fn pull_image(&self, image_reference: &str) -> DeployResult<()> {
        info!(image = %image_reference, "Pulling image");
        self.run(&["pull", image_reference]).await
    }

    async fn compose_up(&self, descriptor: &Path) -> DeployResult<()> {
        let descriptor = descriptor.to_string_lossy();
        info!(descriptor = %descriptor, "Restarting the service");
        self.run(&["compose", "-f", &descriptor, "up", "-d"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_runner_program_from_runtime() {
        assert_eq!(
            CliDeploymentRunner::new(ContainerRuntime::Podman).program(),
            "podman"
        );
        assert_eq!(CliDeploymentRunner::default().program(), "docker");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = CliDeploymentRunner::with_program("/nonexistent/container-runtime");
        let result = runner.pull_image("example/app:1.0.0").await;
        match result {
            Err(DeployError::Spawn { command, .. }) => {
                assert_eq!(
                    command,
                    "/nonexistent/container-runtime pull example/app:1.0.0"
                );
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_command_failure() {
        let runner = CliDeploymentRunner::with_program("false");
        let result = runner.pull_image("example/app:1.0.0").await;
        assert!(matches!(result, Err(DeployError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let runner = CliDeploymentRunner::with_program("true");
        runner.pull_image("example/app:1.0.0").await.unwrap();
        runner
            .compose_up(&PathBuf::from("/app/compose/docker-compose.prod.yml"))
            .await
            .unwrap();
    }

    #[test]
    fn test_deploy_error_display() {
        let error = DeployError::CommandFailed {
            command: "docker pull app:1.0.0".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "manifest unknown".to_string(),
        };
        assert!(error.to_string().contains("docker pull app:1.0.0"));
        assert!(error.to_string().contains("manifest unknown"));
    }
}
