//! Plugin `metadata.txt` files and the per-plugin record reported by the API.

use lizmap_core::LizmapError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Section holding the plugin description in `metadata.txt`.
pub const GENERAL_SECTION: &str = "general";

/// Keys reported for every active plugin. `name` is the display name, which
/// may differ from the plugin folder.
pub const METADATA_KEYS: [&str; 6] = [
    "name",
    "version",
    "commitNumber",
    "commitSha1",
    "dateTime",
    "repository",
];

/// Parsed INI content of a `metadata.txt`, keys kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMetadata {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl PluginMetadata {
    pub fn read(path: &Path) -> Result<Self, LizmapError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, LizmapError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut section: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Indented line continues the previous value.
            if line.len() != trimmed.len() {
                if let (Some(s), Some(k)) = (&section, &last_key) {
                    if let Some(value) = sections.get_mut(s).and_then(|m| m.get_mut(k)) {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(name) = trimmed.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                section = Some(name);
                last_key = None;
                continue;
            }

            let Some(current) = &section else {
                return Err(LizmapError::Manifest(format!(
                    "line {}: key outside of any section",
                    lineno + 1
                )));
            };
            let Some(pos) = trimmed.find(['=', ':']) else {
                return Err(LizmapError::Manifest(format!(
                    "line {}: expected 'key = value'",
                    lineno + 1
                )));
            };
            let key = trimmed[..pos].trim().to_string();
            let value = trimmed[pos + 1..].trim().to_string();
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(Self { sections })
    }

    /// Exact-case lookup.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(|v| v.as_str())
    }

    /// Case-insensitive key lookup.
    pub fn get_ignore_case(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section).and_then(|s| {
            s.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Copy with every key lower-cased. Later duplicates win.
    pub fn with_lowercase_keys(&self) -> Self {
        let sections = self
            .sections
            .iter()
            .map(|(name, entries)| {
                let lowered = entries
                    .iter()
                    .map(|(k, v)| (k.to_lowercase(), v.clone()))
                    .collect();
                (name.clone(), lowered)
            })
            .collect();
        Self { sections }
    }
}

/// Metadata reported for one active plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    pub commit_number: String,
    pub commit_sha1: String,
    pub date_time: String,
    pub repository: String,
}

/// An entry of the `plugins` map: either a described plugin or the stub
/// inserted for an expected plugin that is not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Found(PluginDescriptor),
    Missing { version: &'static str },
}

pub const NOT_FOUND: &str = "not found";

impl PluginEntry {
    pub fn missing() -> Self {
        PluginEntry::Missing { version: NOT_FOUND }
    }
}
