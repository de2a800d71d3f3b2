use crate::error::DeployError;
use crate::fs::FileSystem;
use crate::pipeline::context::DeploymentContext;
use crate::pipeline::phase_trait::DeploymentPhase;
use crate::pipeline::DeploymentState;
use crate::stack::StackDetector;
use async_trait::async_trait;
use std::sync::Arc;

pub struct DetectPhase {
    fs: Arc<dyn FileSystem>,
}

impl DetectPhase {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl DeploymentPhase for DetectPhase {
    fn state(&self) -> DeploymentState {
        DeploymentState::Detecting
    }

    async fn execute(&self, context: &mut DeploymentContext) -> Result<(), DeployError> {
        let profile = StackDetector::new(self.fs.as_ref()).detect(&context.snapshot);

        // Keep the partial profile around for reporting even when an axis is unknown
        let unknown = profile.first_unknown();
        context.profile = Some(profile);

        match unknown {
            Some(axis) => Err(DeployError::TechnologyUnknown { axis }),
            None => Ok(()),
        }
    }
}
