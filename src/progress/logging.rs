//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { repository } => {
                info!(repository = %repository, "Starting deployment");
            }
            ProgressEvent::PhaseStarted { state } => {
                info!(state = %state, "Entering state");
            }
            ProgressEvent::PhaseComplete { state, duration } => {
                info!(
                    state = %state,
                    duration_ms = duration.as_millis(),
                    "State complete"
                );
            }
            ProgressEvent::RolledBack {
                path,
                stack_stopped,
            } => {
                warn!(path = %path, stack_stopped, "Rolled back deployment");
            }
            ProgressEvent::Failed { state, error } => {
                warn!(state = %state, error = %error, "Deployment failed");
            }
            ProgressEvent::Completed { total_time } => {
                info!(
                    total_time_ms = total_time.as_millis(),
                    "Deployment ready"
                );
            }
        }
    }
}
