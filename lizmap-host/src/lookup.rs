//! Best-effort metadata lookup: tries several spellings of the plugin id and
//! the key before giving up.

use crate::backend::PluginBackend;
use crate::metadata::PluginDescriptor;

pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    Exact,
    LowercaseKey,
    LowercasePlugin,
    LowercaseBoth,
}

impl LookupStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [LookupStrategy; 4] = [
        LookupStrategy::Exact,
        LookupStrategy::LowercaseKey,
        LookupStrategy::LowercasePlugin,
        LookupStrategy::LowercaseBoth,
    ];

    /// `(plugin, key)` to query with this strategy.
    pub fn apply(&self, plugin: &str, key: &str) -> (String, String) {
        match self {
            LookupStrategy::Exact => (plugin.to_string(), key.to_string()),
            LookupStrategy::LowercaseKey => (plugin.to_string(), key.to_lowercase()),
            LookupStrategy::LowercasePlugin => (plugin.to_lowercase(), key.to_string()),
            LookupStrategy::LowercaseBoth => (plugin.to_lowercase(), key.to_lowercase()),
        }
    }
}

/// First non-empty metadata value, or `unknown`.
pub fn plugin_metadata_key(backend: &dyn PluginBackend, plugin: &str, key: &str) -> String {
    let mut tried: Vec<(String, String)> = Vec::with_capacity(LookupStrategy::ORDER.len());
    for strategy in LookupStrategy::ORDER {
        let candidate = strategy.apply(plugin, key);
        if tried.contains(&candidate) {
            continue;
        }
        match backend.plugin_metadata(&candidate.0, &candidate.1) {
            Ok(value) if !value.is_empty() => return value,
            Ok(_) => {}
            Err(e) => {
                tracing::trace!(plugin = %candidate.0, key = %candidate.1, error = %e, "Metadata lookup missed");
            }
        }
        tried.push(candidate);
    }
    UNKNOWN.to_string()
}

/// Describe one active plugin.
pub fn describe_plugin(backend: &dyn PluginBackend, plugin: &str) -> PluginDescriptor {
    let get = |key: &str| plugin_metadata_key(backend, plugin, key);
    PluginDescriptor {
        name: get("name"),
        version: get("version"),
        commit_number: get("commitNumber"),
        commit_sha1: get("commitSha1"),
        date_time: get("dateTime"),
        repository: get("repository"),
    }
}
