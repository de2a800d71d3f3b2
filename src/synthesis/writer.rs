//! Writes an artifact set into a repository tree

use super::ArtifactSet;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every artifact, overwriting existing files. Returns the absolute paths written.
    pub fn write(&self, artifacts: &ArtifactSet) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(artifacts.len());

        for artifact in artifacts.iter() {
            let path = self.root.join(&artifact.relative_path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(&path, &artifact.content)
                .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
            debug!(path = %path.display(), bytes = artifact.content.len(), "Artifact written");
            written.push(path);
        }

        Ok(written)
    }
}
