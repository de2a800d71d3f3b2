//! Typed views over the dependency manifests the detectors read

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// The subset of `package.json` the pipeline relies on.
///
/// Absent or `null` dependency tables deserialize to empty maps, so a
/// lookup on a missing table is simply "not declared".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub scripts: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Whether `name` appears in the runtime `dependencies` table
    pub fn declares(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    pub fn main_entry(&self) -> Option<&str> {
        self.main
            .as_deref()
            .map(str::trim)
            .filter(|main| !main.is_empty())
    }
}

/// A `requirements.txt` decoded and normalized for matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    normalized: String,
    packages: Vec<String>,
}

impl Requirements {
    /// Decode raw bytes (UTF-8 or UTF-16) and normalize: `\r` removed,
    /// trimmed, lower-cased.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let normalized = decode_text(bytes).replace('\r', "").trim().to_lowercase();

        let packages = normalized
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
            .filter_map(|line| {
                let name = line
                    .split(|c: char| "=<>!~;[ @".contains(c))
                    .next()
                    .unwrap_or("")
                    .trim()
                    .replace('_', "-");
                (!name.is_empty()).then_some(name)
            })
            .collect();

        Self {
            normalized,
            packages,
        }
    }

    /// Substring match over the normalized file contents
    pub fn mentions(&self, token: &str) -> bool {
        self.normalized.contains(&token.to_lowercase())
    }

    /// Exact match against a declared package name
    pub fn declares(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }
}

/// Decode text that may be UTF-8 or UTF-16 (with or without a BOM)
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ if bytes.len() >= 2 && bytes.contains(&0) => {
            let odd_nuls = bytes.iter().skip(1).step_by(2).filter(|b| **b == 0).count();
            let even_nuls = bytes.iter().step_by(2).filter(|b| **b == 0).count();
            if odd_nuls >= even_nuls {
                decode_utf16(bytes, u16::from_le_bytes)
            } else {
                decode_utf16(bytes, u16::from_be_bytes)
            }
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
