use super::context::DeploymentContext;
use super::DeploymentState;
use crate::error::DeployError;
use async_trait::async_trait;

#[async_trait]
pub trait DeploymentPhase: Send + Sync {
    /// State the orchestrator is in while this phase runs
    fn state(&self) -> DeploymentState;

    async fn execute(&self, context: &mut DeploymentContext) -> Result<(), DeployError>;
}
