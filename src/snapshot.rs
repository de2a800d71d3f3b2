//! Read-only view of a cloned repository's top-level layout

use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Structural role a top-level directory can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Frontend,
    Backend,
    Database,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Frontend, Role::Backend, Role::Database];

    /// Accepted directory names, in preference order
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Role::Frontend => &["frontend", "client"],
            Role::Backend => &["backend", "server"],
            Role::Database => &["database", "db"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Frontend => f.write_str("frontend"),
            Role::Backend => f.write_str("backend"),
            Role::Database => f.write_str("database"),
        }
    }
}

/// Directory names that satisfy each role in a particular repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLayout {
    pub frontend: String,
    pub backend: String,
    pub database: String,
}

impl RoleLayout {
    pub fn dir(&self, role: Role) -> &str {
        match role {
            Role::Frontend => &self.frontend,
            Role::Backend => &self.backend,
            Role::Database => &self.database,
        }
    }
}

impl Default for RoleLayout {
    fn default() -> Self {
        Self {
            frontend: "frontend".to_string(),
            backend: "backend".to_string(),
            database: "database".to_string(),
        }
    }
}

/// Snapshot of a repository root and which role directories exist in it.
///
/// Captured once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    root: PathBuf,
    present: BTreeSet<&'static str>,
}

impl RepositorySnapshot {
    pub fn capture(fs: &dyn FileSystem, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let present = Role::ALL
            .iter()
            .flat_map(|role| role.synonyms().iter().copied())
            .filter(|name| fs.is_dir(&root.join(name)))
            .collect();

        Self { root, present }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_dir(&self, name: &str) -> bool {
        self.present.contains(name)
    }

    /// First synonym of `role` present in the tree
    pub fn role_dir(&self, role: Role) -> Option<&'static str> {
        role.synonyms()
            .iter()
            .copied()
            .find(|name| self.present.contains(name))
    }

    pub fn role_path(&self, role: Role) -> Option<PathBuf> {
        self.role_dir(role).map(|name| self.root.join(name))
    }

    /// Resolved layout, or `None` when any role is unsatisfied
    pub fn layout(&self) -> Option<RoleLayout> {
        Some(RoleLayout {
            frontend: self.role_dir(Role::Frontend)?.to_string(),
            backend: self.role_dir(Role::Backend)?.to_string(),
            database: self.role_dir(Role::Database)?.to_string(),
        })
    }
}
