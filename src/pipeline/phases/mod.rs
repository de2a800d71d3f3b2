// Deployment phases, one per non-terminal orchestrator state after Idle.

#[path = "01_validate.rs"]
pub mod validate;
#[path = "02_detect.rs"]
pub mod detect;
#[path = "03_synthesize.rs"]
pub mod synthesize;
#[path = "04_build.rs"]
pub mod build;
#[path = "05_readiness.rs"]
pub mod readiness;

pub use build::BuildPhase;
pub use detect::DetectPhase;
pub use readiness::ReadinessPhase;
pub use synthesize::SynthesizePhase;
pub use validate::ValidatePhase;
