use crate::error::DeployError;
use crate::pipeline::context::DeploymentContext;
use crate::pipeline::phase_trait::DeploymentPhase;
use crate::pipeline::DeploymentState;
use crate::runtime::classify::classify;
use crate::runtime::BuildRunner;
use crate::synthesis::ArtifactWriter;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Writes the artifacts into the tree, then builds and starts the stack
pub struct BuildPhase {
    runner: Arc<dyn BuildRunner>,
}

impl BuildPhase {
    pub fn new(runner: Arc<dyn BuildRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DeploymentPhase for BuildPhase {
    fn state(&self) -> DeploymentState {
        DeploymentState::Building
    }

    async fn execute(&self, context: &mut DeploymentContext) -> Result<(), DeployError> {
        let artifacts = context.artifacts(self.state())?;
        let written = ArtifactWriter::new(context.root())
            .write(artifacts)
            .map_err(|e| {
                DeployError::io(
                    self.state(),
                    "Failed to write deployment artifacts",
                    format!("{:#}", e),
                )
            })?;
        info!(files = written.len(), "Artifacts written");
        context.written = written;

        let output = self.runner.up(context.root()).await;
        debug!(exit_code = ?output.exit_code, "Build output:\n{}", output.output);

        let failure = classify(&output);
        context.build_output = Some(output.clone());

        match failure {
            None => Ok(()),
            Some(kind) => {
                warn!(kind = %kind, "Build failed");
                Err(DeployError::BuildError {
                    kind,
                    output: output.output,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildFailure;
    use crate::fs::RealFileSystem;
    use crate::runtime::BuildOutput;
    use crate::stack::{BackendTechnology, DatabaseTechnology, FrontendTechnology, StackProfile};
    use crate::synthesis::{ManifestSynthesizer, ServiceSettings};
    use std::path::Path;
    use tempfile::TempDir;

    struct ScriptedRunner(BuildOutput);

    #[async_trait]
    impl BuildRunner for ScriptedRunner {
        async fn up(&self, _root: &Path) -> BuildOutput {
            self.0.clone()
        }

        async fn down(&self, _root: &Path) -> BuildOutput {
            BuildOutput::succeeded("")
        }
    }

    fn synthesized_context(root: &Path) -> DeploymentContext {
        let mut context = DeploymentContext::new(&RealFileSystem::new(), root);
        let profile = StackProfile::new(
            FrontendTechnology::Angular,
            BackendTechnology::NodeJs,
            DatabaseTechnology::MongoDb,
        );
        let settings = ServiceSettings {
            backend_port: 5000,
            backend_entry: "server.js".to_string(),
        };
        context.artifacts = Some(
            ManifestSynthesizer::new()
                .synthesize(&profile, &settings)
                .unwrap(),
        );
        context.profile = Some(profile);
        context
    }

    #[tokio::test]
    async fn test_writes_artifacts_before_building() {
        let temp = TempDir::new().unwrap();
        let mut context = synthesized_context(temp.path());

        BuildPhase::new(Arc::new(ScriptedRunner(BuildOutput::succeeded("Started"))))
            .execute(&mut context)
            .await
            .unwrap();

        assert_eq!(context.written.len(), 6);
        assert!(temp.path().join("docker-compose.yml").is_file());
        assert!(temp.path().join("backend/Dockerfile").is_file());
    }

    #[tokio::test]
    async fn test_port_conflict_is_classified() {
        let temp = TempDir::new().unwrap();
        let mut context = synthesized_context(temp.path());
        let runner = ScriptedRunner(BuildOutput::failed(
            "Bind for 0.0.0.0:80 failed: port is already allocated",
        ));

        let err = BuildPhase::new(Arc::new(runner))
            .execute(&mut context)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DeployError::BuildError {
                kind: BuildFailure::PortConflict,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unrecognised_failure_keeps_raw_output() {
        let temp = TempDir::new().unwrap();
        let mut context = synthesized_context(temp.path());
        let runner = ScriptedRunner(BuildOutput::failed("npm ERR! code ELIFECYCLE"));

        let err = BuildPhase::new(Arc::new(runner))
            .execute(&mut context)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DeployError::BuildError {
                kind: BuildFailure::Other,
                output: "npm ERR! code ELIFECYCLE".to_string(),
            }
        );
    }
}
