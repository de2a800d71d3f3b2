//! Build-and-start through `docker compose`

use super::docker;
use super::BuildOutput;
use crate::synthesis::compose::COMPOSE_FILE;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// External build-and-start operation over a generated compose manifest
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Build images and start the stack detached
    async fn up(&self, root: &Path) -> BuildOutput;

    /// Stop the stack and remove its containers
    async fn down(&self, root: &Path) -> BuildOutput;
}

pub struct DockerComposeRunner {
    docker_bin: String,
    preflight: bool,
}

impl DockerComposeRunner {
    /// The daemon ping before `up` only runs for the Docker CLI
    pub fn new(docker_bin: impl Into<String>) -> Self {
        let docker_bin = docker_bin.into();
        Self {
            preflight: docker::is_docker_cli(&docker_bin),
            docker_bin,
        }
    }

    /// Skip the daemon ping before `up`
    pub fn without_preflight(mut self) -> Self {
        self.preflight = false;
        self
    }

    async fn compose(&self, root: &Path, args: &[&str]) -> BuildOutput {
        debug!(
            "Compose command: {} compose -f {} {}",
            self.docker_bin,
            COMPOSE_FILE,
            args.join(" ")
        );

        let result = Command::new(&self.docker_bin)
            .arg("compose")
            .args(["-f", COMPOSE_FILE])
            .args(args)
            .current_dir(root)
            .output()
            .await;

        match result {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                BuildOutput {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    output: combined,
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                BuildOutput::runtime_unavailable(format!(
                    "Container runtime CLI not found: {}",
                    self.docker_bin
                ))
            }
            Err(e) => BuildOutput::failed(format!("Failed to execute {}: {}", self.docker_bin, e)),
        }
    }
}

impl Default for DockerComposeRunner {
    fn default() -> Self {
        Self::new("docker")
    }
}

#[async_trait]
impl BuildRunner for DockerComposeRunner {
    async fn up(&self, root: &Path) -> BuildOutput {
        if self.preflight {
            if let Err(message) = docker::ping_runtime().await {
                return BuildOutput::runtime_unavailable(message);
            }
        }

        info!(root = %root.display(), "Building and starting stack");
        self.compose(root, &["up", "--build", "-d"]).await
    }

    async fn down(&self, root: &Path) -> BuildOutput {
        info!(root = %root.display(), "Stopping stack");
        self.compose(root, &["down", "--remove-orphans"]).await
    }
}
