//! Deployment error taxonomy

use crate::extractors::PortUnresolved;
use crate::pipeline::DeploymentState;
use crate::snapshot::Role;
use crate::stack::Axis;
use crate::synthesis::SynthesisError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneFailureKind {
    NotFound,
    Other,
}

impl fmt::Display for CloneFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneFailureKind::NotFound => f.write_str("repository not found"),
            CloneFailureKind::Other => f.write_str("clone failed"),
        }
    }
}

/// Classified build-and-start failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildFailure {
    PortConflict,
    RuntimeUnavailable,
    Other,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildFailure::PortConflict => f.write_str("port already in use"),
            BuildFailure::RuntimeUnavailable => f.write_str("container runtime unavailable"),
            BuildFailure::Other => f.write_str("build failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("Invalid repository reference: {reference}")]
    InvalidReference { reference: String },

    #[error("Clone failed ({kind}): {message}")]
    CloneFailure {
        kind: CloneFailureKind,
        message: String,
    },

    #[error("Repository structure invalid: missing {}", format_roles(.missing))]
    StructureInvalid { missing: Vec<Role> },

    #[error("Could not determine the {axis} technology")]
    TechnologyUnknown { axis: Axis },

    #[error("Manifest synthesis unsupported: {0}")]
    SynthesisUnsupported(#[from] SynthesisError),

    #[error("Port unresolved: {0}")]
    PortUnresolved(#[from] PortUnresolved),

    #[error("Build failed ({kind})")]
    BuildError { kind: BuildFailure, output: String },

    #[error("Stack did not become ready at {url} after {attempts} attempts")]
    ReadinessTimeout { url: String, attempts: u32 },

    #[error("{context}: {message}")]
    Io {
        state: DeploymentState,
        context: String,
        message: String,
    },

    /// A phase ran without the output of the phase it depends on
    #[error("{state} ran before its inputs were available: {message}")]
    Internal {
        state: DeploymentState,
        message: String,
    },
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DeployError {
    pub fn io(
        state: DeploymentState,
        context: impl Into<String>,
        error: impl fmt::Display,
    ) -> Self {
        DeployError::Io {
            state,
            context: context.into(),
            message: error.to_string(),
        }
    }

    /// State the error is raised in
    pub fn stage(&self) -> DeploymentState {
        match self {
            DeployError::InvalidReference { .. } | DeployError::CloneFailure { .. } => {
                DeploymentState::Idle
            }
            DeployError::StructureInvalid { .. } => DeploymentState::Validating,
            DeployError::TechnologyUnknown { .. } => DeploymentState::Detecting,
            DeployError::SynthesisUnsupported(_) | DeployError::PortUnresolved(_) => {
                DeploymentState::Synthesizing
            }
            DeployError::BuildError { .. } => DeploymentState::Building,
            DeployError::ReadinessTimeout { .. } => DeploymentState::AwaitingReadiness,
            DeployError::Io { state, .. } | DeployError::Internal { state, .. } => *state,
        }
    }

    /// Returns a user-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            DeployError::InvalidReference { reference } => format!(
                "Error: Invalid repository reference\nReference: {}\n\n\
                Help: Only public GitHub repositories are supported.\n\
                Use the form https://github.com/<owner>/<repo>",
                reference
            ),
            DeployError::CloneFailure {
                kind: CloneFailureKind::NotFound,
                message,
            } => format!(
                "Error: Repository not found\n\n\
                Help: Check that the repository exists and is public.\n\n\
                Details: {}",
                message
            ),
            DeployError::CloneFailure { message, .. } => format!(
                "Error: Failed to clone repository\n\n\
                Help: Check network connectivity and that git is installed.\n\n\
                Details: {}",
                message
            ),
            DeployError::StructureInvalid { missing } => format!(
                "Error: Repository structure invalid\nMissing: {}\n\n\
                Help: The repository root must contain three directories:\n\
                - frontend (or client)\n\
                - backend (or server)\n\
                - database (or db)",
                format_roles(missing)
            ),
            DeployError::TechnologyUnknown { axis } => {
                let supported = match axis {
                    Axis::Frontend => "react, react with vite, vue, angular",
                    Axis::Backend => "node.js (package.json), flask (requirements.txt)",
                    Axis::Database => "mysql, postgres, mongodb, redis, sqlite",
                };
                format!(
                    "Error: Unsupported {} technology\n\n\
                    Help: Supported {} stacks: {}",
                    axis, axis, supported
                )
            }
            DeployError::SynthesisUnsupported(err) => format!(
                "Error: Cannot generate deployment manifests\n\nDetails: {}",
                err
            ),
            DeployError::PortUnresolved(err) => format!(
                "Error: Backend port could not be determined\n\n\
                Help: Declare it explicitly in {}/.env, e.g. PORT=5000\n\n\
                Details: {}",
                err.dir, err
            ),
            DeployError::BuildError {
                kind: BuildFailure::PortConflict,
                ..
            } => "Error: Port already in use\n\n\
                Help: Another service is bound to a port the stack publishes.\n\
                Stop it or any previous deployment, then retry."
                .to_string(),
            DeployError::BuildError {
                kind: BuildFailure::RuntimeUnavailable,
                ..
            } => "Error: Container runtime unavailable\n\n\
                Help: Make sure Docker is installed and the daemon is running:\n\
                - docker info"
                .to_string(),
            DeployError::BuildError { output, .. } => {
                format!("Error: Build failed\n\nOutput:\n{}", output)
            }
            DeployError::ReadinessTimeout { url, attempts } => format!(
                "Error: Deployment did not become ready\n\n\
                Help: {} did not respond successfully after {} attempts.\n\
                Inspect the containers with: docker compose logs",
                url, attempts
            ),
            DeployError::Io {
                context, message, ..
            } => {
                format!("Error: {}\n\nDetails: {}", context, message)
            }
            DeployError::Internal { .. } => format!("Error: {}\n\nThis is a bug.", self),
        }
    }
}
