//! External collaborators of the deployment pipeline: cloning, the
//! container build-and-start operation, failure classification, and
//! readiness probing.

pub mod classify;
pub mod clone;
pub mod compose;
pub mod docker;
pub mod probe;

pub use clone::{GitCloner, RepositoryCloner, RepositoryReference};
pub use compose::{BuildRunner, DockerComposeRunner};
pub use probe::{poll_readiness, HttpProbe, ReadinessOutcome, ReadinessProbe};

use serde::Serialize;

/// Exit status and combined stdout/stderr of a build-and-start run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

impl BuildOutput {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            output: output.into(),
        }
    }

    /// Synthetic output for a runtime that could not be reached at all
    pub fn runtime_unavailable(message: impl Into<String>) -> Self {
        Self::failed(message)
    }
}
