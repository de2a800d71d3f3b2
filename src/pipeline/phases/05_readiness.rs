use crate::error::DeployError;
use crate::pipeline::context::DeploymentContext;
use crate::pipeline::phase_trait::DeploymentPhase;
use crate::pipeline::DeploymentState;
use crate::runtime::{poll_readiness, ReadinessProbe};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct ReadinessPhase {
    probe: Arc<dyn ReadinessProbe>,
    interval: Duration,
    max_attempts: u32,
}

impl ReadinessPhase {
    pub fn new(probe: Arc<dyn ReadinessProbe>, interval: Duration, max_attempts: u32) -> Self {
        Self {
            probe,
            interval,
            max_attempts,
        }
    }
}

#[async_trait]
impl DeploymentPhase for ReadinessPhase {
    fn state(&self) -> DeploymentState {
        DeploymentState::AwaitingReadiness
    }

    async fn execute(&self, context: &mut DeploymentContext) -> Result<(), DeployError> {
        let outcome = poll_readiness(self.probe.as_ref(), self.interval, self.max_attempts).await;
        context.readiness = Some(outcome);

        if outcome.ready {
            Ok(())
        } else {
            Err(DeployError::ReadinessTimeout {
                url: self.probe.target(),
                attempts: outcome.attempts,
            })
        }
    }
}
