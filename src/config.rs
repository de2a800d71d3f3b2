//! Configuration management for autodeploy
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `AUTODEPLOY_CLONE_DIR`: workspace root for cloned repositories - default: system temp dir + "autodeploy-repos"
//! - `AUTODEPLOY_READINESS_URL`: readiness probe endpoint - default: "http://localhost:80/"
//! - `AUTODEPLOY_READINESS_INTERVAL_SECS`: delay between probe attempts - default: "5"
//! - `AUTODEPLOY_READINESS_MAX_ATTEMPTS`: bound on probe attempts - default: "12"
//! - `AUTODEPLOY_PROBE_TIMEOUT_SECS`: per-attempt HTTP timeout - default: "5"
//! - `AUTODEPLOY_DOCKER_BIN`: container runtime CLI - default: "docker"
//! - `AUTODEPLOY_TEARDOWN_ON_TIMEOUT`: stop the stack and delete the tree on readiness timeout - default: "true"
//! - `AUTODEPLOY_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use autodeploy::DeployConfig;
//!
//! let config = DeployConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CLONE_DIR_NAME: &str = "autodeploy-repos";
const DEFAULT_READINESS_URL: &str = "http://localhost:80/";
const DEFAULT_READINESS_INTERVAL_SECS: u64 = 5;
const DEFAULT_READINESS_MAX_ATTEMPTS: u32 = 12;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DOCKER_BIN: &str = "docker";
const DEFAULT_TEARDOWN_ON_TIMEOUT: bool = true;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Directory under which each request gets its own clone
    pub clone_dir: PathBuf,

    pub readiness_url: String,

    pub readiness_interval_secs: u64,

    pub readiness_max_attempts: u32,

    pub probe_timeout_secs: u64,

    pub docker_bin: String,

    /// Run `compose down` and delete the tree when readiness times out
    pub teardown_on_timeout: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Default for DeployConfig {
    fn default() -> Self {
        let clone_dir = env::var("AUTODEPLOY_CLONE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_CLONE_DIR_NAME));

        let readiness_url = env::var("AUTODEPLOY_READINESS_URL")
            .unwrap_or_else(|_| DEFAULT_READINESS_URL.to_string());

        let docker_bin =
            env::var("AUTODEPLOY_DOCKER_BIN").unwrap_or_else(|_| DEFAULT_DOCKER_BIN.to_string());

        let log_level = env::var("AUTODEPLOY_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            clone_dir,
            readiness_url,
            readiness_interval_secs: env_parse(
                "AUTODEPLOY_READINESS_INTERVAL_SECS",
                DEFAULT_READINESS_INTERVAL_SECS,
            ),
            readiness_max_attempts: env_parse(
                "AUTODEPLOY_READINESS_MAX_ATTEMPTS",
                DEFAULT_READINESS_MAX_ATTEMPTS,
            ),
            probe_timeout_secs: env_parse(
                "AUTODEPLOY_PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            ),
            docker_bin,
            teardown_on_timeout: env_parse(
                "AUTODEPLOY_TEARDOWN_ON_TIMEOUT",
                DEFAULT_TEARDOWN_ON_TIMEOUT,
            ),
            log_level,
        }
    }
}

impl DeployConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=300).contains(&self.readiness_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "Readiness interval must be between 1 and 300 seconds".to_string(),
            ));
        }

        if !(1..=1000).contains(&self.readiness_max_attempts) {
            return Err(ConfigError::ValidationFailed(
                "Readiness max attempts must be between 1 and 1000".to_string(),
            ));
        }

        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Probe timeout must be at least 1 second".to_string(),
            ));
        }

        reqwest::Url::parse(&self.readiness_url).map_err(|e| ConfigError::ParseError {
            field: "AUTODEPLOY_READINESS_URL".to_string(),
            error: e.to_string(),
        })?;

        if self.docker_bin.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Docker binary cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn readiness_interval(&self) -> Duration {
        Duration::from_secs(self.readiness_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl fmt::Display for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Autodeploy Configuration:")?;
        writeln!(f, "  Clone Dir: {}", self.clone_dir.display())?;
        writeln!(f, "  Readiness URL: {}", self.readiness_url)?;
        writeln!(
            f,
            "  Readiness: {} attempts every {}s",
            self.readiness_max_attempts, self.readiness_interval_secs
        )?;
        writeln!(f, "  Probe Timeout: {}s", self.probe_timeout_secs)?;
        writeln!(f, "  Docker Binary: {}", self.docker_bin)?;
        writeln!(f, "  Teardown On Timeout: {}", self.teardown_on_timeout)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("AUTODEPLOY_CLONE_DIR"),
            EnvGuard::unset("AUTODEPLOY_READINESS_URL"),
            EnvGuard::unset("AUTODEPLOY_READINESS_INTERVAL_SECS"),
            EnvGuard::unset("AUTODEPLOY_READINESS_MAX_ATTEMPTS"),
            EnvGuard::unset("AUTODEPLOY_TEARDOWN_ON_TIMEOUT"),
            EnvGuard::set("AUTODEPLOY_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        ];

        let config = DeployConfig::default();

        assert_eq!(config.clone_dir, env::temp_dir().join("autodeploy-repos"));
        assert_eq!(config.readiness_url, DEFAULT_READINESS_URL);
        assert_eq!(config.readiness_interval_secs, DEFAULT_READINESS_INTERVAL_SECS);
        assert_eq!(config.readiness_max_attempts, DEFAULT_READINESS_MAX_ATTEMPTS);
        assert!(config.teardown_on_timeout);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("AUTODEPLOY_CLONE_DIR", "/srv/deploys"),
            EnvGuard::set("AUTODEPLOY_READINESS_URL", "http://localhost:8080/health"),
            EnvGuard::set("AUTODEPLOY_READINESS_INTERVAL_SECS", "2"),
            EnvGuard::set("AUTODEPLOY_READINESS_MAX_ATTEMPTS", "30"),
            EnvGuard::set("AUTODEPLOY_DOCKER_BIN", "podman"),
            EnvGuard::set("AUTODEPLOY_TEARDOWN_ON_TIMEOUT", "false"),
            EnvGuard::set("AUTODEPLOY_LOG_LEVEL", "DEBUG"),
        ];

        let config = DeployConfig::default();

        assert_eq!(config.clone_dir, PathBuf::from("/srv/deploys"));
        assert_eq!(config.readiness_url, "http://localhost:8080/health");
        assert_eq!(config.readiness_interval(), Duration::from_secs(2));
        assert_eq!(config.readiness_max_attempts, 30);
        assert_eq!(config.docker_bin, "podman");
        assert!(!config.teardown_on_timeout);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back_to_defaults() {
        let _guards = vec![
            EnvGuard::set("AUTODEPLOY_READINESS_MAX_ATTEMPTS", "many"),
            EnvGuard::set("AUTODEPLOY_TEARDOWN_ON_TIMEOUT", "yes please"),
        ];

        let config = DeployConfig::default();
        assert_eq!(config.readiness_max_attempts, DEFAULT_READINESS_MAX_ATTEMPTS);
        assert_eq!(config.teardown_on_timeout, DEFAULT_TEARDOWN_ON_TIMEOUT);
    }

    #[test]
    #[serial]
    fn test_validation_ranges() {
        let mut config = DeployConfig::default();
        config.log_level = "info".to_string();
        config.readiness_url = DEFAULT_READINESS_URL.to_string();

        config.readiness_interval_secs = 0;
        assert!(config.validate().is_err());
        config.readiness_interval_secs = 5;

        config.readiness_max_attempts = 0;
        assert!(config.validate().is_err());
        config.readiness_max_attempts = 12;

        config.readiness_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ParseError { .. })
        ));
        config.readiness_url = DEFAULT_READINESS_URL.to_string();

        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = DeployConfig::default();
        let display = format!("{}", config);
        assert!(display.contains("Autodeploy Configuration:"));
        assert!(display.contains("Readiness URL:"));
    }
}
