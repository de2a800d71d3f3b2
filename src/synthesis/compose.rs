//! Compose manifest schema
//!
//! Typed service/network/volume declarations serialized with serde_yaml.
//! Maps are ordered so the rendered manifest is byte-stable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const NETWORK_NAME: &str = "app-network";
pub const VOLUME_NAME: &str = "db-data";

pub const FRONTEND_SERVICE: &str = "frontend";
pub const BACKEND_SERVICE: &str = "backend";
pub const DATABASE_SERVICE: &str = "db";

/// Container health check configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Healthcheck {
    pub test: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl Healthcheck {
    fn with_test(test: Vec<String>) -> Self {
        Self {
            test,
            interval: Some("10s".to_string()),
            timeout: Some("5s".to_string()),
            retries: Some(5),
        }
    }

    /// `["CMD", args...]`
    pub fn cmd(args: &[&str]) -> Self {
        let test = std::iter::once("CMD")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        Self::with_test(test)
    }

    /// `["CMD-SHELL", command]`
    pub fn shell(command: &str) -> Self {
        Self::with_test(vec!["CMD-SHELL".to_string(), command.to_string()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCondition {
    ServiceStarted,
    ServiceHealthy,
    ServiceCompletedSuccessfully,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    pub condition: DependencyCondition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeService {
    pub build: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, DependsOn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<Healthcheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    #[serde(default)]
    pub networks: Vec<String>,
}

impl ComposeService {
    pub fn depends_on(&self, service: &str) -> Option<DependencyCondition> {
        self.depends_on.get(service).map(|d| d.condition)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ComposeService>,
    #[serde(default)]
    pub networks: BTreeMap<String, Network>,
    #[serde(default)]
    pub volumes: BTreeMap<String, Volume>,
}

impl ComposeFile {
    pub fn service(&self, name: &str) -> Option<&ComposeService> {
        self.services.get(name)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize compose manifest to YAML")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse compose manifest")
    }

    /// Every service must be attached to a declared network, and every
    /// dependency must name a declared service
    pub fn validate(&self) -> Result<()> {
        for (name, service) in &self.services {
            if service.build.is_empty() {
                anyhow::bail!("Service '{}' has no build context", name);
            }
            for network in &service.networks {
                if !self.networks.contains_key(network) {
                    anyhow::bail!("Service '{}' uses undeclared network '{}'", name, network);
                }
            }
            for dependency in service.depends_on.keys() {
                if !self.services.contains_key(dependency) {
                    anyhow::bail!("Service '{}' depends on unknown service '{}'", name, dependency);
                }
            }
        }
        Ok(())
    }
}
