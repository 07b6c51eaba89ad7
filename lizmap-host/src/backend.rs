//! The two server runtimes able to host the plugin, each with its own
//! plugin metadata API.

use crate::metadata::{GENERAL_SECTION, PluginMetadata};
use crate::registry::PluginRegistry;
use lizmap_core::LizmapError;
use lizmap_core::config::BackendKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Plugin listing and metadata access offered by the hosting runtime.
pub trait PluginBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Identifiers of the plugins currently active on the server.
    fn list_plugins(&self) -> Vec<String>;

    /// Raw metadata value. Errors when the plugin or the key is unknown.
    fn plugin_metadata(&self, plugin: &str, key: &str) -> Result<String, LizmapError>;
}

fn active_list(registry: &PluginRegistry, active: &Option<Vec<String>>) -> Vec<String> {
    match active {
        Some(list) => list.clone(),
        None => registry.list().into_iter().map(str::to_string).collect(),
    }
}

/// Plain QGIS Server. Plugin ids are case-sensitive, metadata keys are not.
pub struct QgisBackend {
    registry: Arc<PluginRegistry>,
    active: Option<Vec<String>>,
}

impl QgisBackend {
    pub fn new(registry: Arc<PluginRegistry>, active: Option<Vec<String>>) -> Self {
        Self { registry, active }
    }
}

impl PluginBackend for QgisBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Qgis
    }

    fn list_plugins(&self) -> Vec<String> {
        active_list(&self.registry, &self.active)
    }

    fn plugin_metadata(&self, plugin: &str, key: &str) -> Result<String, LizmapError> {
        let meta = self
            .registry
            .get(plugin)
            .ok_or_else(|| LizmapError::PluginNotFound(plugin.to_string()))?;
        meta.get_ignore_case(GENERAL_SECTION, key)
            .map(str::to_string)
            .ok_or_else(|| LizmapError::MetadataKeyMissing {
                plugin: plugin.to_string(),
                key: key.to_string(),
            })
    }
}

/// Py-QGIS-Server. Its loader lower-cases every metadata key, lookups are
/// then exact.
pub struct PyQgisServerBackend {
    registry: Arc<PluginRegistry>,
    lowered: HashMap<String, PluginMetadata>,
    active: Option<Vec<String>>,
}

impl PyQgisServerBackend {
    pub fn new(registry: Arc<PluginRegistry>, active: Option<Vec<String>>) -> Self {
        let lowered = registry
            .list()
            .into_iter()
            .filter_map(|id| {
                registry
                    .get(id)
                    .map(|m| (id.to_string(), m.with_lowercase_keys()))
            })
            .collect();
        Self {
            registry,
            lowered,
            active,
        }
    }
}

impl PluginBackend for PyQgisServerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PyQgisServer
    }

    fn list_plugins(&self) -> Vec<String> {
        active_list(&self.registry, &self.active)
    }

    fn plugin_metadata(&self, plugin: &str, key: &str) -> Result<String, LizmapError> {
        let meta = self
            .lowered
            .get(plugin)
            .ok_or_else(|| LizmapError::PluginNotFound(plugin.to_string()))?;
        meta.get(GENERAL_SECTION, key)
            .map(str::to_string)
            .ok_or_else(|| LizmapError::MetadataKeyMissing {
                plugin: plugin.to_string(),
                key: key.to_string(),
            })
    }
}
