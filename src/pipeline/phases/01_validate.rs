use crate::error::DeployError;
use crate::pipeline::context::DeploymentContext;
use crate::pipeline::phase_trait::DeploymentPhase;
use crate::pipeline::DeploymentState;
use crate::validation::StructureValidator;
use async_trait::async_trait;
use tracing::debug;

#[derive(Default)]
pub struct ValidatePhase {
    validator: StructureValidator,
}

impl ValidatePhase {
    pub fn new(validator: StructureValidator) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl DeploymentPhase for ValidatePhase {
    fn state(&self) -> DeploymentState {
        DeploymentState::Validating
    }

    async fn execute(&self, context: &mut DeploymentContext) -> Result<(), DeployError> {
        if !self.validator.validate(&context.snapshot) {
            return Err(DeployError::StructureInvalid {
                missing: self.validator.missing_roles(&context.snapshot),
            });
        }

        debug!(layout = ?context.snapshot.layout(), "Repository structure valid");
        Ok(())
    }
}
