use crate::error::DeployError;
use crate::extractors::{EntryPointDetector, PortResolver};
use crate::fs::FileSystem;
use crate::pipeline::context::DeploymentContext;
use crate::pipeline::phase_trait::DeploymentPhase;
use crate::pipeline::DeploymentState;
use crate::synthesis::{ManifestSynthesizer, ServiceSettings, SynthesisError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Resolves the backend port and entry file, then synthesizes the artifact set in memory
pub struct SynthesizePhase {
    fs: Arc<dyn FileSystem>,
    synthesizer: ManifestSynthesizer,
}

impl SynthesizePhase {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            synthesizer: ManifestSynthesizer::new(),
        }
    }
}

#[async_trait]
impl DeploymentPhase for SynthesizePhase {
    fn state(&self) -> DeploymentState {
        DeploymentState::Synthesizing
    }

    async fn execute(&self, context: &mut DeploymentContext) -> Result<(), DeployError> {
        let profile = context.profile(self.state())?;
        if let Some(axis) = profile.first_unknown() {
            return Err(SynthesisError::UnknownTechnology { axis }.into());
        }

        let backend = profile.backend.technology;
        let backend_dir_name = profile.layout.backend.as_str();
        let backend_dir = context.root.join(backend_dir_name);

        let port = PortResolver::new(self.fs.as_ref()).resolve(
            &backend_dir,
            backend_dir_name,
            backend,
        )?;
        let entry = EntryPointDetector::new(self.fs.as_ref()).detect(&backend_dir, backend);
        info!(
            port = port.port,
            source = ?port.source,
            entry = %entry,
            "Backend settings resolved"
        );

        let settings = ServiceSettings {
            backend_port: port.port,
            backend_entry: entry,
        };
        let artifacts = self.synthesizer.synthesize(profile, &settings)?;

        context.settings = Some(settings);
        context.artifacts = Some(artifacts);
        Ok(())
    }
}
