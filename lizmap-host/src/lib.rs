pub mod backend;
pub mod environment;
pub mod lookup;
pub mod metadata;
pub mod registry;
pub mod runtime;
pub mod services;

use backend::{PluginBackend, PyQgisServerBackend, QgisBackend};
use environment::{EnvironmentInspector, HostManifest};
use lizmap_core::LizmapError;
use lizmap_core::config::{BackendKind, HostConfig};
use registry::PluginRegistry;
use runtime::ServerRuntimeInfo;
use services::{ServiceRegistry, StaticServiceRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Read-only view of the hosting server, shared by every request.
///
/// Built once at startup; the backend flavour is chosen here and never
/// re-checked afterwards.
#[derive(Clone)]
pub struct Host {
    pub backend: Arc<dyn PluginBackend>,
    pub services: Arc<dyn ServiceRegistry>,
    pub environment: Arc<dyn EnvironmentInspector>,
    pub runtime_manifest: Option<PathBuf>,
}

impl Host {
    pub fn new(
        backend: Arc<dyn PluginBackend>,
        services: Arc<dyn ServiceRegistry>,
        environment: Arc<dyn EnvironmentInspector>,
        runtime_manifest: Option<PathBuf>,
    ) -> Self {
        Self {
            backend,
            services,
            environment,
            runtime_manifest,
        }
    }

    pub fn from_config(config: &HostConfig) -> Result<Self, LizmapError> {
        let registry = Arc::new(PluginRegistry::discover(&config.plugin_paths));
        info!(plugins = registry.len(), backend = %config.backend, "Plugin metadata loaded");

        let active = config.active_plugins.clone();
        let backend: Arc<dyn PluginBackend> = match config.backend {
            BackendKind::Qgis => Arc::new(QgisBackend::new(registry, active)),
            BackendKind::PyQgisServer => Arc::new(PyQgisServerBackend::new(registry, active)),
        };

        let manifest = match &config.manifest {
            Some(path) => {
                info!(path = %path.display(), "Loading host manifest");
                HostManifest::load(path)?
            }
            None => HostManifest::default(),
        };
        let services = Arc::new(StaticServiceRegistry::new(manifest.services.clone()));

        Ok(Self::new(
            backend,
            services,
            Arc::new(manifest),
            config.py_qgis_server_manifest.clone(),
        ))
    }

    /// Metadata of the alternate server runtime, probed on each call.
    pub fn runtime_info(&self) -> ServerRuntimeInfo {
        runtime::probe(self.backend.kind(), self.runtime_manifest.as_deref())
    }
}
