pub mod commands;
pub mod output;

pub use commands::{CliArgs, Commands, DeployArgs, DetectArgs, GenerateArgs, HealthArgs};
pub use output::{OutputFormat, OutputFormatter};
