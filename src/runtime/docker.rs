use bollard::Docker;
use std::path::Path;
use tracing::debug;

const DOCKER_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Whether `bin` names the Docker CLI, whose daemon [`ping_runtime`] can reach
pub fn is_docker_cli(bin: &str) -> bool {
    Path::new(bin)
        .file_stem()
        .is_some_and(|stem| stem == "docker")
}

/// Check that the Docker daemon answers a ping.
///
/// Returns the failure as text so it can be fed to the build output classifier.
pub async fn ping_runtime() -> Result<(), String> {
    if std::env::var_os("DOCKER_HOST").is_none() && !Path::new(DOCKER_SOCKET_PATH).exists() {
        debug!("Docker socket not found at {}", DOCKER_SOCKET_PATH);
        return Err(format!(
            "Cannot connect to the Docker daemon at unix://{}. Is the docker daemon running?",
            DOCKER_SOCKET_PATH
        ));
    }

    let docker = Docker::connect_with_local_defaults().map_err(|e| {
        debug!("Failed to connect to Docker: {}", e);
        format!("Cannot connect to the Docker daemon: {}", e)
    })?;

    match docker.ping().await {
        Ok(_) => {
            if let Ok(version) = docker.version().await {
                debug!(
                    "Docker API version: {}",
                    version.api_version.unwrap_or_else(|| "unknown".to_string())
                );
            }
            Ok(())
        }
        Err(e) => {
            debug!("Docker ping failed: {}", e);
            Err(format!(
                "Cannot connect to the Docker daemon: {}. Is the docker daemon running?",
                e
            ))
        }
    }
}
