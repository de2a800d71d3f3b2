//! Stack inference for frontend, backend, and database directories.
//!
//! Each axis is a closed technology enumeration with a trailing `Unknown`
//! variant. Detectors are ordered rule lists evaluated against facts read
//! once from the repository, so detection is deterministic and read-only.
//!
//! # Example
//!
//! ```no_run
//! use autodeploy::fs::RealFileSystem;
//! use autodeploy::snapshot::RepositorySnapshot;
//! use autodeploy::stack::StackDetector;
//!
//! let fs = RealFileSystem;
//! let snapshot = RepositorySnapshot::capture(&fs, "/tmp/repo");
//! let profile = StackDetector::new(fs).detect(&snapshot);
//! println!("{} / {} / {}", profile.frontend.technology, profile.backend.technology, profile.database.technology);
//! ```

#[macro_use]
pub mod id_enum_macro;

pub mod backend;
pub mod database;
pub mod frontend;
pub mod manifest;
pub mod profile;
pub mod rules;
pub mod technology;

pub use manifest::{PackageManifest, Requirements};
pub use profile::{StackDetector, StackProfile};
pub use rules::{Detection, Evidence};
pub use technology::{Axis, BackendTechnology, DatabaseTechnology, FrontendTechnology};
