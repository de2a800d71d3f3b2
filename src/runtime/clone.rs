//! Repository references and cloning

use crate::error::{CloneFailureKind, DeployError};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, error, warn};

const GITHUB_PREFIX: &str = "https://github.com/";

/// A sanitised `https://github.com/<owner>/<repo>` reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReference {
    owner: String,
    name: String,
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl RepositoryReference {
    pub fn parse(input: &str) -> Result<Self, DeployError> {
        let invalid = || DeployError::InvalidReference {
            reference: input.to_string(),
        };

        let path = input
            .trim()
            .strip_prefix(GITHUB_PREFIX)
            .ok_or_else(invalid)?
            .trim_end_matches('/');

        let mut segments = path.split('/');
        let (owner, repo) = match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(repo), None) => (owner, repo),
            _ => return Err(invalid()),
        };
        let name = repo.strip_suffix(".git").unwrap_or(repo);

        if !valid_segment(owner) || !valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clone_url(&self) -> String {
        format!("{}{}/{}.git", GITHUB_PREFIX, self.owner, self.name)
    }

    /// Per-request directory name, `<repo>-<unix-millis>`
    pub fn workspace_dir_name(&self, unix_millis: i64) -> String {
        format!("{}-{}", self.name, unix_millis)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", GITHUB_PREFIX, self.owner, self.name)
    }
}

/// Produces a repository tree at a caller-chosen path
#[async_trait]
pub trait RepositoryCloner: Send + Sync {
    async fn clone_repository(
        &self,
        reference: &RepositoryReference,
        target: &Path,
    ) -> Result<(), DeployError>;
}

/// Map git's stderr to a clone failure kind
pub fn classify_clone_output(stderr: &str) -> CloneFailureKind {
    let lower = stderr.to_lowercase();
    if lower.contains("not found")
        || lower.contains("does not exist")
        || lower.contains("could not read username")
    {
        CloneFailureKind::NotFound
    } else {
        CloneFailureKind::Other
    }
}

/// Shallow clone through the `git` CLI
pub struct GitCloner {
    git_bin: String,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self {
            git_bin: "git".to_string(),
        }
    }
}

impl GitCloner {
    async fn discard_partial(target: &Path) {
        if tokio::fs::metadata(target).await.is_ok() {
            if let Err(e) = tokio::fs::remove_dir_all(target).await {
                warn!(path = %target.display(), error = %e, "Failed to remove partial clone");
            }
        }
    }
}

#[async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_repository(
        &self,
        reference: &RepositoryReference,
        target: &Path,
    ) -> Result<(), DeployError> {
        let url = reference.clone_url();
        debug!("Git clone command: {} clone --depth 1 {} {}", self.git_bin, url, target.display());

        let output = Command::new(&self.git_bin)
            .args(["clone", "--depth", "1", &url])
            .arg(target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| DeployError::CloneFailure {
                kind: CloneFailureKind::Other,
                message: format!("Failed to execute git clone: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(repository = %reference, "Git clone failed: {}", stderr);
            Self::discard_partial(target).await;
            return Err(DeployError::CloneFailure {
                kind: classify_clone_output(&stderr),
                message: stderr,
            });
        }

        Ok(())
    }
}
