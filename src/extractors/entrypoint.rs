//! Backend entry-file detection

use crate::fs::FileSystem;
use crate::stack::{BackendTechnology, PackageManifest};
use std::path::Path;
use tracing::debug;

const NODE_CONVENTIONAL_ENTRIES: &[&str] = &["server.js", "index.js", "app.js"];
const NODE_DEFAULT_ENTRY: &str = "server.js";

const PYTHON_MANAGE_ENTRY: &str = "manage.py";
const PYTHON_MAIN_GUARD: &str = "__main__";
const PYTHON_DEFAULT_ENTRY: &str = "app.py";

/// Finds the file a backend container should run, relative to the backend dir
pub struct EntryPointDetector<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> EntryPointDetector<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Entry file for `technology`, falling back to the ecosystem default
    pub fn detect(&self, backend_dir: &Path, technology: BackendTechnology) -> String {
        let entry = match technology {
            BackendTechnology::NodeJs => self.node_entry(backend_dir),
            BackendTechnology::PythonFlask => self.python_entry(backend_dir),
            BackendTechnology::Unknown => None,
        };

        let entry = entry.unwrap_or_else(|| default_entry(technology).to_string());
        debug!(technology = %technology, entry = %entry, "Backend entry file");
        entry
    }

    /// Entry file plus the conventional candidates, existing files only
    pub fn candidates(&self, backend_dir: &Path, technology: BackendTechnology) -> Vec<String> {
        let mut files = vec![self.detect(backend_dir, technology)];
        if technology == BackendTechnology::NodeJs {
            for name in NODE_CONVENTIONAL_ENTRIES {
                if !files.iter().any(|f| f == name) {
                    files.push(name.to_string());
                }
            }
        }
        files.retain(|f| self.fs.is_file(&backend_dir.join(f)));
        files
    }

    fn node_entry(&self, backend_dir: &Path) -> Option<String> {
        let from_manifest = self
            .fs
            .read_to_string(&backend_dir.join("package.json"))
            .ok()
            .and_then(|content| PackageManifest::parse(&content).ok())
            .and_then(|manifest| {
                manifest
                    .main_entry()
                    .map(|m| m.trim_start_matches("./").to_string())
            });

        from_manifest.or_else(|| {
            NODE_CONVENTIONAL_ENTRIES
                .iter()
                .find(|name| self.fs.is_file(&backend_dir.join(name)))
                .map(|name| name.to_string())
        })
    }

    fn python_entry(&self, backend_dir: &Path) -> Option<String> {
        if self.fs.is_file(&backend_dir.join(PYTHON_MANAGE_ENTRY)) {
            return Some(PYTHON_MANAGE_ENTRY.to_string());
        }

        let entries = self.fs.read_dir_sorted(backend_dir).ok()?;
        entries
            .into_iter()
            .filter(|e| e.is_file() && e.name.ends_with(".py"))
            .find(|e| {
                self.fs
                    .read(e.path())
                    .map(|bytes| String::from_utf8_lossy(&bytes).contains(PYTHON_MAIN_GUARD))
                    .unwrap_or(false)
            })
            .map(|e| e.name)
    }
}

fn default_entry(technology: BackendTechnology) -> &'static str {
    match technology {
        BackendTechnology::PythonFlask => PYTHON_DEFAULT_ENTRY,
        _ => NODE_DEFAULT_ENTRY,
    }
}
