use crate::metadata::PluginMetadata;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const METADATA_FILE: &str = "metadata.txt";

/// Metadata of every plugin installed on the host, keyed by plugin folder.
///
/// Built once at startup, immutable thereafter. Backends receive a shared
/// `Arc<PluginRegistry>`.
pub struct PluginRegistry {
    plugins: BTreeMap<String, PluginMetadata>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
        }
    }

    /// Scan plugin directories for `<id>/metadata.txt`.
    ///
    /// Earlier paths take precedence, like the host's own plugin path order.
    /// Unreadable directories and broken metadata files are skipped.
    pub fn discover(paths: &[PathBuf]) -> Self {
        let mut registry = Self::new();
        for path in paths {
            registry.scan(path);
        }
        registry
    }

    fn scan(&mut self, path: &Path) {
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Plugin path not readable");
                return;
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.join(METADATA_FILE).is_file())
            .collect();
        dirs.sort();

        for dir in dirs {
            let Some(id) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if self.plugins.contains_key(&id) {
                warn!(plugin = %id, path = %dir.display(), "Plugin already found in an earlier path, skipped");
                continue;
            }
            match PluginMetadata::read(&dir.join(METADATA_FILE)) {
                Ok(meta) => {
                    debug!(plugin = %id, path = %dir.display(), "Found plugin");
                    self.plugins.insert(id, meta);
                }
                Err(e) => {
                    warn!(plugin = %id, error = %e, "Invalid plugin metadata, skipped");
                }
            }
        }
    }

    /// Register the metadata of a plugin.
    pub fn register(&mut self, id: impl Into<String>, metadata: PluginMetadata) {
        let id = id.into();
        tracing::info!(plugin = %id, "Registered plugin");
        self.plugins.insert(id, metadata);
    }

    pub fn get(&self, id: &str) -> Option<&PluginMetadata> {
        self.plugins.get(id)
    }

    /// All plugin ids, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.plugins.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
