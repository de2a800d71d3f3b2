//! Backend detection (nodejs, python-flask)

use super::manifest::Requirements;
use super::rules::{first_match, Detection, Rule};
use super::BackendTechnology;
use crate::fs::FileSystem;
use std::path::Path;
use tracing::warn;

const FLASK_MARKER: &str = "flask";

#[derive(Debug, Clone, Default)]
pub struct BackendFacts {
    pub dir: String,
    pub has_package_json: bool,
    pub requirements: Option<Requirements>,
}

impl BackendFacts {
    pub fn gather(fs: &dyn FileSystem, backend_dir: &Path, dir_name: &str) -> Self {
        let requirements_path = backend_dir.join("requirements.txt");
        let requirements = if fs.is_file(&requirements_path) {
            match fs.read(&requirements_path) {
                Ok(bytes) => Some(Requirements::from_bytes(&bytes)),
                Err(e) => {
                    warn!(
                        path = %requirements_path.display(),
                        error = %e,
                        "Ignoring unreadable requirements.txt"
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            dir: dir_name.to_string(),
            has_package_json: fs.is_file(&backend_dir.join("package.json")),
            requirements,
        }
    }
}

fn node_manifest(facts: &BackendFacts) -> Option<String> {
    facts
        .has_package_json
        .then(|| format!("{}/package.json", facts.dir))
}

fn flask_requirement(facts: &BackendFacts) -> Option<String> {
    facts
        .requirements
        .as_ref()
        .filter(|reqs| reqs.mentions(FLASK_MARKER))
        .map(|_| format!("{}/requirements.txt", facts.dir))
}

/// Backend rules in priority order: a Node manifest wins over Python requirements
pub const BACKEND_RULES: &[Rule<BackendFacts, BackendTechnology>] = &[
    Rule {
        name: "node-package-manifest",
        technology: BackendTechnology::NodeJs,
        predicate: node_manifest,
    },
    Rule {
        name: "flask-requirement",
        technology: BackendTechnology::PythonFlask,
        predicate: flask_requirement,
    },
];

pub fn classify(facts: &BackendFacts) -> Detection<BackendTechnology> {
    first_match(BACKEND_RULES, facts).unwrap_or_else(|| Detection::bare(BackendTechnology::Unknown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn detect(fs: &MockFileSystem) -> Detection<BackendTechnology> {
        classify(&BackendFacts::gather(fs, Path::new("/mock/backend"), "backend"))
    }

    #[test]
    fn test_node_backend() {
        let fs = MockFileSystem::new();
        fs.add_file("backend/package.json", r#"{"dependencies":{"express":"4"}}"#);

        let detection = detect(&fs);
        assert_eq!(detection.technology, BackendTechnology::NodeJs);
        assert_eq!(detection.evidence.unwrap().source, "backend/package.json");
    }

    #[test]
    fn test_node_manifest_wins_over_requirements() {
        let fs = MockFileSystem::new();
        fs.add_file("backend/package.json", "{}");
        fs.add_file("backend/requirements.txt", "flask\n");

        assert_eq!(detect(&fs).technology, BackendTechnology::NodeJs);
    }

    #[test]
    fn test_flask_backend_case_insensitive() {
        let fs = MockFileSystem::new();
        fs.add_file("backend/requirements.txt", "Flask==3.0.2\r\nSQLAlchemy\r\n");

        assert_eq!(detect(&fs).technology, BackendTechnology::PythonFlask);
    }

    #[test]
    fn test_flask_backend_utf16() {
        let fs = MockFileSystem::new();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "FLASK==2.0\r\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs.add_bytes("backend/requirements.txt", &bytes);

        assert_eq!(detect(&fs).technology, BackendTechnology::PythonFlask);
    }

    #[test]
    fn test_python_without_flask_is_unknown() {
        let fs = MockFileSystem::new();
        fs.add_file("backend/requirements.txt", "django==5.0\n");

        let detection = detect(&fs);
        assert_eq!(detection.technology, BackendTechnology::Unknown);
        assert!(detection.evidence.is_none());
    }

    #[test]
    fn test_empty_backend_is_unknown() {
        let fs = MockFileSystem::new();
        fs.add_dir("backend");
        assert!(detect(&fs).technology.is_unknown());
    }
}
