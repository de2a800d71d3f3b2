//! .env file parsing utilities

use crate::fs::FileSystem;
use std::path::Path;

/// Key prefixes of port variables that belong to a database engine, not the backend
const DATABASE_PORT_PREFIXES: &[&str] = &[
    "DB_",
    "DATABASE_",
    "POSTGRES_",
    "MYSQL_",
    "MONGO_",
    "REDIS_",
];

/// Ordered `KEY=value` pairs from a `.env` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let line = line.strip_prefix("export ").unwrap_or(line);
                let (key, value) = line.split_once('=')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), unquote(value.trim()).to_string()))
            })
            .collect();

        Self { entries }
    }

    /// Read and parse `path`, `None` when the file is missing or unreadable
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Option<Self> {
        if !fs.is_file(path) {
            return None;
        }
        fs.read(path)
            .ok()
            .map(|bytes| Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Backend port override: an exact `PORT` key first, then the first
    /// `*PORT` key that does not belong to a database engine. Keys whose
    /// value is not a usable port are skipped.
    pub fn port_override(&self) -> Option<(&str, u16)> {
        let ports = || {
            self.entries
                .iter()
                .filter_map(|(k, v)| parse_port(v).map(|port| (k.as_str(), port)))
        };

        ports()
            .find(|(k, _)| k.eq_ignore_ascii_case("PORT"))
            .or_else(|| {
                ports().find(|(k, _)| {
                    let upper = k.to_ascii_uppercase();
                    upper.ends_with("PORT")
                        && !DATABASE_PORT_PREFIXES.iter().any(|p| upper.starts_with(p))
                })
            })
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value.split(" #").next().unwrap_or(value).trim()
}

pub(crate) fn parse_port(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|port| *port > 0)
}
