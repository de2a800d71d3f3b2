use super::rules::Detection;
use super::{backend, database, frontend};
use super::{Axis, BackendTechnology, DatabaseTechnology, FrontendTechnology};
use crate::fs::FileSystem;
use crate::snapshot::{RepositorySnapshot, Role, RoleLayout};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The detected stack of a repository, one technology per axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackProfile {
    pub layout: RoleLayout,
    pub frontend: Detection<FrontendTechnology>,
    pub backend: Detection<BackendTechnology>,
    pub database: Detection<DatabaseTechnology>,
}

impl StackProfile {
    pub fn new(
        frontend: FrontendTechnology,
        backend: BackendTechnology,
        database: DatabaseTechnology,
    ) -> Self {
        Self {
            layout: RoleLayout::default(),
            frontend: Detection::bare(frontend),
            backend: Detection::bare(backend),
            database: Detection::bare(database),
        }
    }

    pub fn with_layout(mut self, layout: RoleLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Axes that could not be identified, in frontend, backend, database order
    pub fn unknown_axes(&self) -> Vec<Axis> {
        let mut axes = Vec::new();
        if self.frontend.technology.is_unknown() {
            axes.push(Axis::Frontend);
        }
        if self.backend.technology.is_unknown() {
            axes.push(Axis::Backend);
        }
        if self.database.technology.is_unknown() {
            axes.push(Axis::Database);
        }
        axes
    }

    pub fn first_unknown(&self) -> Option<Axis> {
        self.unknown_axes().into_iter().next()
    }

    pub fn is_complete(&self) -> bool {
        self.first_unknown().is_none()
    }
}

/// Runs the three detectors against a repository snapshot.
///
/// Detection is read-only: the same tree always yields the same profile.
pub struct StackDetector<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> StackDetector<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    pub fn detect_frontend(&self, snapshot: &RepositorySnapshot) -> Detection<FrontendTechnology> {
        match snapshot.role_dir(Role::Frontend) {
            Some(dir) => frontend::classify(&frontend::FrontendFacts::gather(
                &self.fs,
                &snapshot.root().join(dir),
                dir,
            )),
            None => Detection::bare(FrontendTechnology::Unknown),
        }
    }

    pub fn detect_backend(&self, snapshot: &RepositorySnapshot) -> Detection<BackendTechnology> {
        match snapshot.role_dir(Role::Backend) {
            Some(dir) => backend::classify(&backend::BackendFacts::gather(
                &self.fs,
                &snapshot.root().join(dir),
                dir,
            )),
            None => Detection::bare(BackendTechnology::Unknown),
        }
    }

    pub fn detect_database(&self, snapshot: &RepositorySnapshot) -> Detection<DatabaseTechnology> {
        database::classify(&database::DatabaseFacts::gather(
            &self.fs,
            snapshot.root(),
            snapshot.role_dir(Role::Backend),
            snapshot.role_dir(Role::Database),
        ))
    }

    pub fn detect(&self, snapshot: &RepositorySnapshot) -> StackProfile {
        let profile = StackProfile {
            layout: snapshot.layout().unwrap_or_default(),
            frontend: self.detect_frontend(snapshot),
            backend: self.detect_backend(snapshot),
            database: self.detect_database(snapshot),
        };

        info!(
            frontend = %profile.frontend.technology,
            backend = %profile.backend.technology,
            database = %profile.database.technology,
            "Stack detected"
        );

        profile
    }
}
