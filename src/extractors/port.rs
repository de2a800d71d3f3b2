//! Port resolver - deterministic backend port resolution
//!
//! Resolution order is fixed: an explicit override in the backend `.env`,
//! then the technology default, then a listen/bind pattern in the entry
//! file(s). Nothing found is an error, never a guess.

use crate::extractors::entrypoint::EntryPointDetector;
use crate::extractors::parsers::env_file::{self, EnvFile};
use crate::fs::FileSystem;
use crate::stack::BackendTechnology;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PortSource {
    /// Key in the backend `.env` file
    EnvFile(String),
    TechnologyDefault,
    /// Entry file that contained the listen pattern
    SourcePattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPort {
    pub port: u16,
    pub source: PortSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve a port for the {technology} backend in {dir}/")]
pub struct PortUnresolved {
    pub technology: BackendTechnology,
    pub dir: String,
}

/// Fixed default port per backend technology
pub fn default_port(technology: BackendTechnology) -> Option<u16> {
    match technology {
        BackendTechnology::NodeJs => Some(5000),
        BackendTechnology::PythonFlask | BackendTechnology::Unknown => None,
    }
}

/// Listen/bind pattern per backend technology, capturing the port literal
pub fn listen_pattern(technology: BackendTechnology) -> Option<&'static str> {
    match technology {
        BackendTechnology::NodeJs => Some(r"listen\s*\(\s*(\d+)"),
        BackendTechnology::PythonFlask => Some(r"\.run\([^)]*port\s*=\s*(\d+)"),
        BackendTechnology::Unknown => None,
    }
}

pub struct PortResolver<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> PortResolver<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    pub fn resolve(
        &self,
        backend_dir: &Path,
        dir_name: &str,
        technology: BackendTechnology,
    ) -> Result<ResolvedPort, PortUnresolved> {
        let resolved = self
            .from_env_file(backend_dir)
            .or_else(|| {
                default_port(technology).map(|port| ResolvedPort {
                    port,
                    source: PortSource::TechnologyDefault,
                })
            })
            .or_else(|| self.from_source(backend_dir, technology));

        match resolved {
            Some(resolved) => {
                debug!(port = resolved.port, source = ?resolved.source, "Backend port resolved");
                Ok(resolved)
            }
            None => Err(PortUnresolved {
                technology,
                dir: dir_name.to_string(),
            }),
        }
    }

    fn from_env_file(&self, backend_dir: &Path) -> Option<ResolvedPort> {
        let env = EnvFile::load(&self.fs, &backend_dir.join(".env"))?;
        env.port_override().map(|(key, port)| ResolvedPort {
            port,
            source: PortSource::EnvFile(key.to_string()),
        })
    }

    fn from_source(
        &self,
        backend_dir: &Path,
        technology: BackendTechnology,
    ) -> Option<ResolvedPort> {
        let re = Regex::new(listen_pattern(technology)?).expect("valid regex");

        EntryPointDetector::new(&self.fs)
            .candidates(backend_dir, technology)
            .into_iter()
            .find_map(|file| {
                let bytes = self.fs.read(&backend_dir.join(&file)).ok()?;
                let content = String::from_utf8_lossy(&bytes);
                let port = re
                    .captures_iter(&content)
                    .find_map(|cap| env_file::parse_port(cap.get(1)?.as_str()))?;
                Some(ResolvedPort {
                    port,
                    source: PortSource::SourcePattern(file),
                })
            })
    }
}
