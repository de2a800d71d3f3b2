//! Database detection
//!
//! Tiers are consulted in order and the first one that produces a match
//! wins; later tiers are never evaluated once an earlier one matched.
//!
//! 1. client libraries declared in the backend dependency manifest
//! 2. connection settings in `.env` files (backend first, then database)
//! 3. embedded database files in the database directory
//! 4. engine keywords in well-known backend config files

use super::manifest::{PackageManifest, Requirements};
use super::rules::Detection;
use super::DatabaseTechnology;
use crate::fs::FileSystem;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// npm client packages, in precedence order
pub const NODE_CLIENTS: &[(&str, DatabaseTechnology)] = &[
    ("mysql", DatabaseTechnology::MySql),
    ("mysql2", DatabaseTechnology::MySql),
    ("pg", DatabaseTechnology::Postgres),
    ("mongodb", DatabaseTechnology::MongoDb),
    ("mongoose", DatabaseTechnology::MongoDb),
    ("redis", DatabaseTechnology::Redis),
    ("ioredis", DatabaseTechnology::Redis),
    ("sqlite3", DatabaseTechnology::Sqlite),
    ("better-sqlite3", DatabaseTechnology::Sqlite),
];

/// PyPI client packages, in precedence order
pub const PYTHON_CLIENTS: &[(&str, DatabaseTechnology)] = &[
    ("psycopg2", DatabaseTechnology::Postgres),
    ("psycopg2-binary", DatabaseTechnology::Postgres),
    ("psycopg", DatabaseTechnology::Postgres),
    ("mysql-connector-python", DatabaseTechnology::MySql),
    ("pymysql", DatabaseTechnology::MySql),
    ("pymongo", DatabaseTechnology::MongoDb),
    ("redis", DatabaseTechnology::Redis),
    ("sqlite3", DatabaseTechnology::Sqlite),
];

/// Connection-string patterns for `.env` files, in precedence order
pub const ENV_PATTERNS: &[(&str, DatabaseTechnology)] = &[
    (r"(?i)DB_CONNECTION\s*=\s*mysql", DatabaseTechnology::MySql),
    (r"(?i)DB_CONNECTION\s*=\s*pgsql", DatabaseTechnology::Postgres),
    (r"(?i)MONGO_URI\s*=\s*mongodb", DatabaseTechnology::MongoDb),
    (r"(?i)REDIS_URL\s*=\s*redis", DatabaseTechnology::Redis),
    (r"(?i)DB_CONNECTION\s*=\s*sqlite", DatabaseTechnology::Sqlite),
    (r"(?i)DATABASE_URL\s*=\s*mysql://", DatabaseTechnology::MySql),
    (r"(?i)DATABASE_URL\s*=\s*postgres(ql)?://", DatabaseTechnology::Postgres),
];

/// Extensions of single-file embedded databases
pub const EMBEDDED_EXTENSIONS: &[&str] = &[".sqlite", ".sqlite3", ".db"];

/// Backend config files scanned by the keyword tier, relative to the backend dir
pub const CONFIG_FILES: &[&str] = &["config.js", "database.js", "config/database.php"];

pub const CONFIG_KEYWORDS: &[(&str, DatabaseTechnology)] = &[
    (r"(?i)mysql", DatabaseTechnology::MySql),
    (r"(?i)postgres|pg:", DatabaseTechnology::Postgres),
    (r"(?i)mongodb|mongo:", DatabaseTechnology::MongoDb),
    (r"(?i)redis", DatabaseTechnology::Redis),
    (r"(?i)sqlite", DatabaseTechnology::Sqlite),
];

/// A text file read for pattern matching, keyed by its repository-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseFacts {
    pub backend_dir: String,
    pub database_dir: String,
    pub npm_dependencies: Option<BTreeSet<String>>,
    pub python_requirements: Option<Requirements>,
    pub env_files: Vec<SourceFile>,
    pub database_files: Vec<String>,
    pub config_files: Vec<SourceFile>,
}

impl DatabaseFacts {
    pub fn gather(
        fs: &dyn FileSystem,
        root: &Path,
        backend_dir: Option<&str>,
        database_dir: Option<&str>,
    ) -> Self {
        let mut facts = Self {
            backend_dir: backend_dir.unwrap_or_default().to_string(),
            database_dir: database_dir.unwrap_or_default().to_string(),
            ..Default::default()
        };

        if let Some(dir) = backend_dir {
            let backend = root.join(dir);

            let manifest_path = backend.join("package.json");
            if fs.is_file(&manifest_path) {
                match fs
                    .read_to_string(&manifest_path)
                    .and_then(|c| PackageManifest::parse(&c).map_err(Into::into))
                {
                    Ok(manifest) => {
                        facts.npm_dependencies =
                            Some(manifest.dependencies.into_keys().collect())
                    }
                    Err(e) => {
                        warn!(
                            path = %manifest_path.display(),
                            error = %e,
                            "Ignoring unreadable package.json"
                        )
                    }
                }
            }

            let requirements_path = backend.join("requirements.txt");
            if let Ok(bytes) = fs.read(&requirements_path) {
                facts.python_requirements = Some(Requirements::from_bytes(&bytes));
            }

            facts.env_files.extend(read_source(fs, root, &format!("{}/.env", dir)));
            facts.config_files = CONFIG_FILES
                .iter()
                .filter_map(|file| read_source(fs, root, &format!("{}/{}", dir, file)))
                .collect();
        }

        if let Some(dir) = database_dir {
            facts.env_files.extend(read_source(fs, root, &format!("{}/.env", dir)));
            facts.database_files = fs
                .read_dir_sorted(&root.join(dir))
                .map(|entries| {
                    entries
                        .into_iter()
                        .filter(|e| e.is_file())
                        .map(|e| e.name)
                        .collect()
                })
                .unwrap_or_default();
        }

        facts
    }
}

fn read_source(fs: &dyn FileSystem, root: &Path, relative: &str) -> Option<SourceFile> {
    let path = root.join(relative);
    if !fs.is_file(&path) {
        return None;
    }
    fs.read(&path).ok().map(|bytes| SourceFile {
        path: relative.to_string(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn match_patterns(
    patterns: &[(&str, DatabaseTechnology)],
    content: &str,
) -> Option<DatabaseTechnology> {
    patterns.iter().find_map(|(pattern, technology)| {
        let re = Regex::new(pattern).expect("valid regex");
        re.is_match(content).then_some(*technology)
    })
}

fn dependency_manifest_tier(facts: &DatabaseFacts) -> Option<Detection<DatabaseTechnology>> {
    if let Some(deps) = &facts.npm_dependencies {
        if let Some((name, technology)) = NODE_CLIENTS.iter().find(|(name, _)| deps.contains(*name))
        {
            return Some(Detection::new(
                *technology,
                &format!("npm-client:{}", name),
                format!("{}/package.json", facts.backend_dir),
            ));
        }
    }

    let reqs = facts.python_requirements.as_ref()?;
    PYTHON_CLIENTS
        .iter()
        .find(|(name, _)| reqs.declares(name))
        .map(|(name, technology)| {
            Detection::new(
                *technology,
                &format!("pypi-client:{}", name),
                format!("{}/requirements.txt", facts.backend_dir),
            )
        })
}

fn env_file_tier(facts: &DatabaseFacts) -> Option<Detection<DatabaseTechnology>> {
    facts.env_files.iter().find_map(|file| {
        match_patterns(ENV_PATTERNS, &file.content)
            .map(|technology| Detection::new(technology, "env-connection", file.path.clone()))
    })
}

fn embedded_file_tier(facts: &DatabaseFacts) -> Option<Detection<DatabaseTechnology>> {
    facts
        .database_files
        .iter()
        .find(|name| EMBEDDED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .map(|name| {
            Detection::new(
                DatabaseTechnology::Sqlite,
                "embedded-database-file",
                format!("{}/{}", facts.database_dir, name),
            )
        })
}

fn config_keyword_tier(facts: &DatabaseFacts) -> Option<Detection<DatabaseTechnology>> {
    facts.config_files.iter().find_map(|file| {
        match_patterns(CONFIG_KEYWORDS, &file.content)
            .map(|technology| Detection::new(technology, "config-keyword", file.path.clone()))
    })
}

type Tier = (
    &'static str,
    fn(&DatabaseFacts) -> Option<Detection<DatabaseTechnology>>,
);

/// Tiers in precedence order
pub const DATABASE_TIERS: &[Tier] = &[
    ("dependency-manifest", dependency_manifest_tier),
    ("env-file", env_file_tier),
    ("embedded-file", embedded_file_tier),
    ("config-keyword", config_keyword_tier),
];

pub fn classify(facts: &DatabaseFacts) -> Detection<DatabaseTechnology> {
    for (name, tier) in DATABASE_TIERS {
        if let Some(detection) = tier(facts) {
            debug!(tier = name, technology = %detection.technology, "Database tier matched");
            return detection;
        }
    }
    Detection::bare(DatabaseTechnology::Unknown)
}
