//! Shared fixtures and fake collaborators for integration tests

use async_trait::async_trait;
use autodeploy::runtime::{
    BuildOutput, BuildRunner, ReadinessProbe, RepositoryCloner, RepositoryReference,
};
use autodeploy::DeployError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Files of a repository tree, relative path to content
pub type Fixture = Vec<(&'static str, &'static str)>;

#[allow(dead_code)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

/// react + vite, express with `pg`, no port override
#[allow(dead_code)]
pub fn react_vite_node_postgres() -> Fixture {
    vec![
        (
            "frontend/package.json",
            r#"{"name":"web","dependencies":{"react":"^18.2.0","react-dom":"^18.2.0"},"devDependencies":{"vite":"^5.0.0"}}"#,
        ),
        ("frontend/vite.config.ts", "export default {}\n"),
        (
            "backend/package.json",
            r#"{"name":"api","main":"server.js","dependencies":{"express":"^4.18.2","pg":"^8.11.0"}}"#,
        ),
        ("backend/server.js", "const app = require('express')();\napp.listen(process.env.PORT);\n"),
        ("database/init.sql", "CREATE TABLE items (id SERIAL PRIMARY KEY);\n"),
    ]
}

/// Frontend and backend only
#[allow(dead_code)]
pub fn missing_database() -> Fixture {
    vec![
        ("client/package.json", r#"{"dependencies":{"vue":"^3.3.0"}}"#),
        ("server/requirements.txt", "Flask==3.0.0\n"),
    ]
}

/// Writes a fixture tree at the clone target instead of running git
#[allow(dead_code)]
pub struct FixtureCloner {
    files: Fixture,
    pub targets: Mutex<Vec<PathBuf>>,
}

#[allow(dead_code)]
impl FixtureCloner {
    pub fn new(files: Fixture) -> Self {
        Self {
            files,
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn last_target(&self) -> PathBuf {
        self.targets.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl RepositoryCloner for FixtureCloner {
    async fn clone_repository(
        &self,
        _reference: &RepositoryReference,
        target: &Path,
    ) -> Result<(), DeployError> {
        std::fs::create_dir_all(target).unwrap();
        write_tree(target, &self.files);
        self.targets.lock().unwrap().push(target.to_path_buf());
        Ok(())
    }
}

/// Returns a fixed `up` output and records calls
#[allow(dead_code)]
pub struct ScriptedRunner {
    up: BuildOutput,
    down_succeeds: bool,
    pub up_calls: AtomicU32,
    pub down_calls: AtomicU32,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn succeeding() -> Self {
        Self::with_output(BuildOutput::succeeded(
            "Container db Healthy\nContainer backend Started\n",
        ))
    }

    pub fn failing(output: &str) -> Self {
        Self::with_output(BuildOutput::failed(output))
    }

    pub fn with_output(up: BuildOutput) -> Self {
        Self {
            up,
            down_succeeds: true,
            up_calls: AtomicU32::new(0),
            down_calls: AtomicU32::new(0),
        }
    }

    pub fn with_failing_down(mut self) -> Self {
        self.down_succeeds = false;
        self
    }

    pub fn up_count(&self) -> u32 {
        self.up_calls.load(Ordering::SeqCst)
    }

    pub fn down_count(&self) -> u32 {
        self.down_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildRunner for ScriptedRunner {
    async fn up(&self, root: &Path) -> BuildOutput {
        assert!(root.join("docker-compose.yml").is_file(), "manifest must be written before up");
        self.up_calls.fetch_add(1, Ordering::SeqCst);
        self.up.clone()
    }

    async fn down(&self, _root: &Path) -> BuildOutput {
        self.down_calls.fetch_add(1, Ordering::SeqCst);
        if self.down_succeeds {
            BuildOutput::succeeded("Container backend Removed\n")
        } else {
            BuildOutput::failed("Cannot connect to the Docker daemon")
        }
    }
}

/// Succeeds on attempt `succeed_on`, or never
#[allow(dead_code)]
pub struct CountingProbe {
    succeed_on: Option<u32>,
    calls: AtomicU32,
}

#[allow(dead_code)]
impl CountingProbe {
    pub fn ready_on(attempt: u32) -> Self {
        Self {
            succeed_on: Some(attempt),
            calls: AtomicU32::new(0),
        }
    }

    pub fn never() -> Self {
        Self {
            succeed_on: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadinessProbe for CountingProbe {
    async fn check(&self) -> bool {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.succeed_on.map_or(false, |n| call >= n)
    }

    fn target(&self) -> String {
        "http://localhost:80/".to_string()
    }
}

#[allow(dead_code)]
pub fn autodeploy_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.join("autodeploy")
}
