use crate::snapshot::{RepositorySnapshot, Role};
use tracing::debug;

/// Checks that a snapshot has a directory for every required role
pub struct StructureValidator {
    required: Vec<Role>,
}

impl StructureValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(required: Vec<Role>) -> Self {
        Self { required }
    }

    pub fn validate(&self, snapshot: &RepositorySnapshot) -> bool {
        let missing = self.missing_roles(snapshot);
        if !missing.is_empty() {
            debug!(root = %snapshot.root().display(), ?missing, "Structure validation failed");
        }
        missing.is_empty()
    }

    /// Required roles with no satisfying directory, in declaration order
    pub fn missing_roles(&self, snapshot: &RepositorySnapshot) -> Vec<Role> {
        self.required
            .iter()
            .copied()
            .filter(|role| snapshot.role_dir(*role).is_none())
            .collect()
    }
}

impl Default for StructureValidator {
    fn default() -> Self {
        Self {
            required: Role::ALL.to_vec(),
        }
    }
}
