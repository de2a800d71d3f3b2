//! autodeploy - stack inference and manifest synthesis for three-tier web repositories
//!
//! Given a repository laid out as frontend, backend and database directories,
//! autodeploy detects the technology of each tier, generates Dockerfiles, a
//! compose manifest, a reverse-proxy config and an ignore list, then builds and
//! starts the stack and polls it until it serves traffic.
//!
//! # Example Usage
//!
//! ```no_run
//! use autodeploy::{DeployConfig, DeploymentOrchestrator};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let orchestrator = DeploymentOrchestrator::from_config(DeployConfig::default())?;
//! let result = orchestrator.run("https://github.com/acme/shop").await;
//!
//! if let Some(error) = &result.error {
//!     eprintln!("{}", error.help_message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`snapshot`] and [`validation`]: which role directories a tree has
//! - [`stack`]: ordered-rule detectors producing a [`StackProfile`]
//! - [`extractors`]: backend port and entry file resolution
//! - [`synthesis`]: pure artifact generation from a profile
//! - [`runtime`]: cloning, `docker compose`, build output classification, readiness probing
//! - [`pipeline`]: the deployment state machine

pub mod cli;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fs;
pub mod pipeline;
pub mod progress;
pub mod runtime;
pub mod snapshot;
pub mod stack;
pub mod synthesis;
pub mod util;
pub mod validation;

pub use config::{ConfigError, DeployConfig};
pub use error::{BuildFailure, CloneFailureKind, DeployError};
pub use pipeline::{DeploymentOrchestrator, DeploymentResult, DeploymentState};
pub use snapshot::{RepositorySnapshot, Role};
pub use stack::{StackDetector, StackProfile};
pub use synthesis::{ArtifactSet, ManifestSynthesizer, ServiceSettings, SynthesisError};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::StructureValidator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
