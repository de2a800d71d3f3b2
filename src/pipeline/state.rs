use crate::error::DeployError;
use crate::stack::StackProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Idle,
    Validating,
    Detecting,
    Synthesizing,
    Building,
    AwaitingReadiness,
    Ready,
    Failed,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Idle => "idle",
            DeploymentState::Validating => "validating",
            DeploymentState::Detecting => "detecting",
            DeploymentState::Synthesizing => "synthesizing",
            DeploymentState::Building => "building",
            DeploymentState::AwaitingReadiness => "awaiting_readiness",
            DeploymentState::Ready => "ready",
            DeploymentState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentState::Ready | DeploymentState::Failed)
    }

    /// States whose failure discards the cloned tree unconditionally
    pub fn rolls_back(&self) -> bool {
        matches!(
            self,
            DeploymentState::Idle
                | DeploymentState::Validating
                | DeploymentState::Detecting
                | DeploymentState::Synthesizing
                | DeploymentState::Building
        )
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal value of one `run`
#[derive(Debug, Clone)]
pub struct DeploymentResult {
    pub repository: String,
    pub state: DeploymentState,
    pub error: Option<DeployError>,
    /// Every state entered, starting at `Idle` and ending at `Ready` or `Failed`
    pub transitions: Vec<DeploymentState>,
    /// Cloned tree, `None` once it has been deleted
    pub workspace: Option<PathBuf>,
    pub profile: Option<StackProfile>,
    pub rolled_back: bool,
    pub stack_stopped: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeploymentResult {
    pub fn is_ready(&self) -> bool {
        self.state == DeploymentState::Ready
    }

    /// Last state entered before `Failed`
    pub fn failed_in(&self) -> Option<DeploymentState> {
        if self.state != DeploymentState::Failed {
            return None;
        }
        self.transitions
            .iter()
            .rev()
            .find(|s| !s.is_terminal())
            .copied()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
