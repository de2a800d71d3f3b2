//! Deployment state machine
//!
//! `Idle -> Validating -> Detecting -> Synthesizing -> Building -> AwaitingReadiness -> Ready | Failed`
//!
//! Each non-terminal state after `Idle` is a [`DeploymentPhase`] run in order by
//! [`DeploymentOrchestrator`], which owns the cloned tree and rolls it back on failure.

pub mod context;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod state;

pub use context::DeploymentContext;
pub use orchestrator::DeploymentOrchestrator;
pub use phase_trait::DeploymentPhase;
pub use state::{DeploymentResult, DeploymentState};
