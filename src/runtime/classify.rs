//! Build output classification
//!
//! Pure mapping from captured build-and-start output to a failure kind, so
//! classification is testable without spawning anything.

use super::BuildOutput;
use crate::error::BuildFailure;

pub const PORT_CONFLICT_SIGNATURES: &[&str] = &[
    "port is already allocated",
    "address already in use",
    "ports are not available",
];

pub const RUNTIME_UNAVAILABLE_SIGNATURES: &[&str] = &[
    "cannot connect to the docker daemon",
    "is the docker daemon running",
    "error during connect",
    "docker daemon is not running",
    "docker: command not found",
    "no such file or directory: 'docker'",
    "container runtime cli not found",
];

/// `None` when the build succeeded
pub fn classify(output: &BuildOutput) -> Option<BuildFailure> {
    if output.success {
        return None;
    }

    let lower = output.output.to_lowercase();
    let matches = |signatures: &[&str]| signatures.iter().any(|s| lower.contains(s));

    Some(if matches(PORT_CONFLICT_SIGNATURES) {
        BuildFailure::PortConflict
    } else if matches(RUNTIME_UNAVAILABLE_SIGNATURES) {
        BuildFailure::RuntimeUnavailable
    } else {
        BuildFailure::Other
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn failed(output: &str) -> BuildOutput {
        BuildOutput {
            success: false,
            exit_code: Some(1),
            output: output.to_string(),
        }
    }

    #[parameterized(
        allocated = { "Error response from daemon: driver failed programming external connectivity: Bind for 0.0.0.0:80 failed: port is already allocated", BuildFailure::PortConflict },
        in_use = { "listen tcp4 0.0.0.0:5432: bind: address already in use", BuildFailure::PortConflict },
        daemon_down = { "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?", BuildFailure::RuntimeUnavailable },
        windows = { "error during connect: this error may indicate that the docker daemon is not running", BuildFailure::RuntimeUnavailable },
        missing_cli = { "sh: docker: command not found", BuildFailure::RuntimeUnavailable },
        spawn_not_found = { "Container runtime CLI not found: podman", BuildFailure::RuntimeUnavailable },
        npm = { "npm ERR! missing script: build", BuildFailure::Other },
        build_tool_missing = { "#12 0.41 sh: react-scripts: command not found\nfailed to solve: process \"/bin/sh -c npm run build\" did not complete successfully: exit code: 127", BuildFailure::Other },
    )]
    fn test_failure_signatures(output: &str, expected: BuildFailure) {
        assert_eq!(classify(&failed(output)), Some(expected));
    }

    #[test]
    fn test_success_is_not_classified() {
        let output = BuildOutput {
            success: true,
            exit_code: Some(0),
            output: "port is already allocated".to_string(),
        };
        assert_eq!(classify(&output), None);
    }

    #[test]
    fn test_port_conflict_takes_precedence() {
        let output = failed("Is the docker daemon running?\nport is already allocated");
        assert_eq!(classify(&output), Some(BuildFailure::PortConflict));
    }
}
