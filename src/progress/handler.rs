//! Progress handler trait and events

use crate::pipeline::DeploymentState;
use std::time::Duration;

/// Events emitted while a deployment moves through its states
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started { repository: String },

    PhaseStarted { state: DeploymentState },

    PhaseComplete {
        state: DeploymentState,
        duration: Duration,
    },

    /// The cloned tree was discarded after a failure
    RolledBack {
        path: String,
        stack_stopped: bool,
    },

    Failed {
        state: DeploymentState,
        error: String,
    },

    Completed { total_time: Duration },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
