//! Frontend detection (react-vite, react, vue, angular)

use super::manifest::PackageManifest;
use super::rules::{first_match, Detection, Rule};
use super::FrontendTechnology;
use crate::fs::FileSystem;
use std::path::Path;
use tracing::warn;

/// Bundler config file names accepted as evidence of a Vite setup
pub const VITE_CONFIG_FILES: &[&str] = &[
    "vite.config.js",
    "vite.config.ts",
    "vite.config.mjs",
    "vite.config.cjs",
    "vite.config.mts",
];

const ANGULAR_MARKER: &str = "angular.json";

/// Everything the frontend rules look at, read once up front
#[derive(Debug, Clone, Default)]
pub struct FrontendFacts {
    pub dir: String,
    pub manifest: Option<PackageManifest>,
    pub bundler_config: Option<&'static str>,
    pub angular_marker: bool,
}

impl FrontendFacts {
    pub fn gather(fs: &dyn FileSystem, frontend_dir: &Path, dir_name: &str) -> Self {
        let manifest_path = frontend_dir.join("package.json");
        let manifest = if fs.is_file(&manifest_path) {
            match fs
                .read_to_string(&manifest_path)
                .and_then(|content| PackageManifest::parse(&content).map_err(Into::into))
            {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    warn!(
                        path = %manifest_path.display(),
                        error = %e,
                        "Ignoring unreadable package.json"
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            dir: dir_name.to_string(),
            manifest,
            bundler_config: VITE_CONFIG_FILES
                .iter()
                .copied()
                .find(|name| fs.is_file(&frontend_dir.join(name))),
            angular_marker: fs.is_file(&frontend_dir.join(ANGULAR_MARKER)),
        }
    }

    fn declares(&self, dependency: &str) -> bool {
        self.manifest
            .as_ref()
            .map(|m| m.declares(dependency))
            .unwrap_or(false)
    }
}

fn react_with_bundler(facts: &FrontendFacts) -> Option<String> {
    let config = facts.bundler_config?;
    facts
        .declares("react")
        .then(|| format!("{0}/package.json, {0}/{1}", facts.dir, config))
}

fn react(facts: &FrontendFacts) -> Option<String> {
    facts
        .declares("react")
        .then(|| format!("{}/package.json", facts.dir))
}

fn vue(facts: &FrontendFacts) -> Option<String> {
    facts
        .declares("vue")
        .then(|| format!("{}/package.json", facts.dir))
}

/// The generated build copies `package.json`, so the marker alone is not enough
fn angular(facts: &FrontendFacts) -> Option<String> {
    (facts.manifest.is_some() && facts.angular_marker)
        .then(|| format!("{}/{}", facts.dir, ANGULAR_MARKER))
}

/// Frontend rules in priority order. `react-vite` must precede `react`.
pub const FRONTEND_RULES: &[Rule<FrontendFacts, FrontendTechnology>] = &[
    Rule {
        name: "react-with-vite-config",
        technology: FrontendTechnology::ReactVite,
        predicate: react_with_bundler,
    },
    Rule {
        name: "react-dependency",
        technology: FrontendTechnology::React,
        predicate: react,
    },
    Rule {
        name: "vue-dependency",
        technology: FrontendTechnology::Vue,
        predicate: vue,
    },
    Rule {
        name: "angular-workspace",
        technology: FrontendTechnology::Angular,
        predicate: angular,
    },
];

pub fn classify(facts: &FrontendFacts) -> Detection<FrontendTechnology> {
    first_match(FRONTEND_RULES, facts)
        .unwrap_or_else(|| Detection::bare(FrontendTechnology::Unknown))
}
