//! Utility modules for autodeploy

pub mod logging;

pub use logging::{init_from_env, init_logging, LoggingConfig};
