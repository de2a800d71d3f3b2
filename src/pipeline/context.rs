//! Per-request state threaded through the deployment phases

use super::DeploymentState;
use crate::error::DeployError;
use crate::fs::FileSystem;
use crate::runtime::{BuildOutput, ReadinessOutcome};
use crate::snapshot::RepositorySnapshot;
use crate::stack::StackProfile;
use crate::synthesis::{ArtifactSet, ServiceSettings};
use std::path::{Path, PathBuf};

/// Owns everything one request derives from its cloned tree
#[derive(Debug)]
pub struct DeploymentContext {
    pub root: PathBuf,

    /// Captured once when the context is created
    pub snapshot: RepositorySnapshot,

    pub profile: Option<StackProfile>,

    pub settings: Option<ServiceSettings>,

    pub artifacts: Option<ArtifactSet>,

    /// Absolute paths of the artifacts written to disk
    pub written: Vec<PathBuf>,

    pub build_output: Option<BuildOutput>,

    pub readiness: Option<ReadinessOutcome>,
}

impl DeploymentContext {
    pub fn new(fs: &dyn FileSystem, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let snapshot = RepositorySnapshot::capture(fs, root.clone());
        Self {
            root,
            snapshot,
            profile: None,
            settings: None,
            artifacts: None,
            written: Vec::new(),
            build_output: None,
            readiness: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile(&self, state: DeploymentState) -> Result<&StackProfile, DeployError> {
        self.profile.as_ref().ok_or_else(|| DeployError::Internal {
            state,
            message: "stack profile missing".to_string(),
        })
    }

    pub fn artifacts(&self, state: DeploymentState) -> Result<&ArtifactSet, DeployError> {
        self.artifacts.as_ref().ok_or_else(|| DeployError::Internal {
            state,
            message: "artifacts missing".to_string(),
        })
    }
}
