//! Output formatting for multiple formats
//!
//! Formatters for JSON, YAML and human-readable text covering deployment
//! results, detected stacks, generated artifacts and health checks.
//!
//! # Example
//!
//! ```ignore
//! use autodeploy::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_profile(&profile)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::pipeline::{DeploymentResult, DeploymentState};
use crate::stack::{Detection, StackProfile};
use crate::synthesis::{ArtifactSet, ServiceSettings};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Serializable view of a [`DeploymentResult`]
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub repository: String,
    pub state: DeploymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_in: Option<DeploymentState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub transitions: Vec<DeploymentState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<StackProfile>,
    pub rolled_back: bool,
    pub stack_stopped: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

impl From<&DeploymentResult> for DeploymentReport {
    fn from(result: &DeploymentResult) -> Self {
        Self {
            repository: result.repository.clone(),
            state: result.state,
            failed_in: result.failed_in(),
            error: result.error.as_ref().map(|e| e.to_string()),
            transitions: result.transitions.clone(),
            workspace: result.workspace.clone(),
            profile: result.profile.clone(),
            rolled_back: result.rolled_back,
            stack_stopped: result.stack_stopped,
            started_at: result.started_at,
            finished_at: result.finished_at,
            elapsed_ms: result.elapsed().num_milliseconds(),
        }
    }
}

/// Serializable view of a `generate` run
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport<'a> {
    pub profile: &'a StackProfile,
    pub settings: &'a ServiceSettings,
    pub artifacts: &'a ArtifactSet,
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Result of a single health check
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub available: bool,
    pub message: String,
}

impl HealthStatus {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_deployment(&self, result: &DeploymentResult) -> Result<String> {
        let report = DeploymentReport::from(result);
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)
                .context("Failed to serialize deployment result to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&report)
                .context("Failed to serialize deployment result to YAML"),
            OutputFormat::Human => Ok(self.format_deployment_human(result)),
        }
    }

    pub fn format_profile(&self, profile: &StackProfile) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(profile)
                .context("Failed to serialize stack profile to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(profile).context("Failed to serialize stack profile to YAML")
            }
            OutputFormat::Human => Ok(format_profile_human(profile)),
        }
    }

    pub fn format_generate(&self, report: &GenerateReport<'_>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize artifacts to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize artifacts to YAML")
            }
            OutputFormat::Human => Ok(self.format_generate_human(report)),
        }
    }

    pub fn format_health(&self, results: &BTreeMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(results)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(results).context("Failed to serialize health status to YAML")
            }
            OutputFormat::Human => {
                let mut output = String::from("Health Check\n");
                output.push_str(RULE);
                output.push_str("\n\n");
                for (name, status) in results {
                    let mark = if status.available { "\u{2713}" } else { "\u{2717}" };
                    output.push_str(&format!("{} {:<10} {}\n", mark, name, status.message));
                }
                Ok(output)
            }
        }
    }

    fn format_deployment_human(&self, result: &DeploymentResult) -> String {
        let mut output = String::new();

        if result.is_ready() {
            output.push_str("\u{2713} Deployment Ready\n");
        } else {
            output.push_str("\u{2717} Deployment Failed\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Repository:  {}\n", result.repository));
        let path: Vec<&str> = result.transitions.iter().map(|s| s.as_str()).collect();
        output.push_str(&format!("States:      {}\n", path.join(" \u{2192} ")));
        if let Some(ref workspace) = result.workspace {
            output.push_str(&format!("Workspace:   {}\n", workspace.display()));
        }
        output.push('\n');

        if let Some(ref profile) = result.profile {
            output.push_str(&format_profile_human(profile));
            output.push('\n');
        }

        if let Some(ref error) = result.error {
            output.push_str(&error.help_message());
            output.push_str("\n\n");
            if result.rolled_back {
                output.push_str("The cloned repository was deleted.\n");
            }
            if result.stack_stopped {
                output.push_str("The started containers were stopped.\n");
            }
        }

        output.push_str(&format!(
            "\nFinished in {}ms\n",
            result.elapsed().num_milliseconds()
        ));
        output
    }

    fn format_generate_human(&self, report: &GenerateReport<'_>) -> String {
        let mut output = format_profile_human(report.profile);
        output.push_str(&format!(
            "\nBackend:  port {}, entry {}\n\n",
            report.settings.backend_port, report.settings.backend_entry
        ));

        if report.dry_run {
            for artifact in report.artifacts.iter() {
                output.push_str(&format!("--- {} ---\n", artifact.relative_path));
                output.push_str(&artifact.content);
                if !artifact.content.ends_with('\n') {
                    output.push('\n');
                }
                output.push('\n');
            }
        } else {
            output.push_str("Written:\n");
            for (i, path) in report.written.iter().enumerate() {
                let connector = if i + 1 == report.written.len() {
                    "\u{2514}"
                } else {
                    "\u{251C}"
                };
                output.push_str(&format!("{}\u{2500} {}\n", connector, path.display()));
            }
        }
        output
    }
}

fn detection_line<T: std::fmt::Display>(detection: &Detection<T>) -> String {
    match &detection.evidence {
        Some(evidence) => format!(
            "{}  ({}: {})",
            detection.technology, evidence.rule, evidence.source
        ),
        None => detection.technology.to_string(),
    }
}

fn format_profile_human(profile: &StackProfile) -> String {
    let mut output = String::from("Stack:\n");
    output.push_str(&format!(
        "\u{251C}\u{2500} Frontend [{}]:  {}\n",
        profile.layout.frontend,
        detection_line(&profile.frontend)
    ));
    output.push_str(&format!(
        "\u{251C}\u{2500} Backend [{}]:   {}\n",
        profile.layout.backend,
        detection_line(&profile.backend)
    ));
    output.push_str(&format!(
        "\u{2514}\u{2500} Database [{}]:  {}\n",
        profile.layout.database,
        detection_line(&profile.database)
    ));
    output
}
