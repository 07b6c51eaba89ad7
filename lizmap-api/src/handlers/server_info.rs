//! `server.json`: what is installed and enabled on this QGIS Server.

use crate::context::RequestContext;
use crate::handler::{ApiHandler, LinkType, ParameterType, QueryParameter};
use lizmap_core::config::BackendKind;
use lizmap_core::{EnvSource, LizmapError, QgisVersion, check_environment_variable, to_bool};
use lizmap_host::Host;
use lizmap_host::lookup::describe_plugin;
use lizmap_host::metadata::PluginEntry;
use lizmap_host::runtime::ServerRuntimeInfo;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Plugins a Lizmap deployment is expected to run. The folder name is used,
/// not the display name.
pub const EXPECTED_PLUGINS: [&str; 3] = ["wfsOutputExtension", "lizmap_server", "atlasprint"];

/// Services probed in the host's service registry, in reporting order.
pub const EXPECTED_SERVICES: [&str; 8] = [
    "WMS",
    "WFS",
    "WCS",
    "WMTS",
    "ATLAS",
    "CADASTRE",
    "EXPRESSION",
    "LIZMAP",
];

pub const CHECK_CUSTOM_HEADERS: &str = "CHECK_CUSTOM_HEADERS";
pub const CUSTOM_HEADER: &str = "X-Check-Custom-Headers";

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub qgis_server: QgisServerInfo,
    pub fonts: Vec<String>,
    pub environment: EnvironmentInfo,
}

#[derive(Debug, Serialize)]
pub struct QgisServerInfo {
    pub metadata: QgisMetadata,
    pub py_qgis_server: PyQgisServerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_custom_headers: Option<bool>,
    pub services: Vec<String>,
    pub plugins: BTreeMap<String, PluginEntry>,
}

#[derive(Debug, Serialize)]
pub struct QgisMetadata {
    pub version: String,
    pub tag: String,
    pub name: String,
    pub commit_id: String,
    pub version_int: u32,
    /// Deprecated, use `py_qgis_server.found`.
    pub py_qgis_server: bool,
    /// Deprecated, use `py_qgis_server.version`.
    pub py_qgis_server_version: String,
}

#[derive(Debug, Serialize)]
pub struct PyQgisServerInfo {
    pub found: bool,
    pub version: String,
    pub build_id: Option<u64>,
    pub commit_id: Option<String>,
    /// Deprecated, use `stable`.
    pub stable_release: bool,
    pub stable: bool,
}

impl From<ServerRuntimeInfo> for PyQgisServerInfo {
    fn from(info: ServerRuntimeInfo) -> Self {
        Self {
            found: info.found,
            version: info.version,
            build_id: info.build_id,
            commit_id: info.commit_id,
            stable_release: info.is_stable,
            stable: info.is_stable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnvironmentInfo {
    pub gdal: String,
    pub python: String,
    pub qt: String,
}

pub struct ServerInfoHandler {
    host: Arc<Host>,
    env: Arc<dyn EnvSource>,
    reveal_settings_env: String,
    path: Regex,
}

impl ServerInfoHandler {
    pub fn new(host: Arc<Host>, env: Arc<dyn EnvSource>, reveal_settings_env: impl Into<String>) -> Self {
        Self {
            host,
            env,
            reveal_settings_env: reveal_settings_env.into(),
            path: Regex::new(r"^server\.json$").expect("static pattern"),
        }
    }

    /// Gather the document. Only the environment check can fail.
    pub fn collect(&self, ctx: &RequestContext) -> Result<ServerInfo, LizmapError> {
        self.authorize(ctx)?;

        let plugins = self.plugins();
        let services = self.services();

        let environment = &self.host.environment;
        let version = QgisVersion::parse(
            &environment.qgis_version(),
            environment.qgis_version_int(),
            &environment.dev_version(),
        );
        let runtime = self.host.runtime_info();
        debug!(
            plugins = plugins.len(),
            services = services.len(),
            version = %version.version,
            "Collected server information"
        );

        Ok(ServerInfo {
            qgis_server: QgisServerInfo {
                metadata: QgisMetadata {
                    tag: version.tag(),
                    commit_id: version.commit_id(),
                    version: version.version,
                    name: version.name,
                    version_int: version.version_int,
                    py_qgis_server: self.host.backend.kind() == BackendKind::PyQgisServer,
                    py_qgis_server_version: runtime.version.clone(),
                },
                py_qgis_server: runtime.into(),
                support_custom_headers: support_custom_headers(ctx),
                services,
                plugins,
            },
            fonts: environment.font_families(),
            environment: EnvironmentInfo {
                gdal: environment.gdal_version(),
                python: environment.python_version(),
                qt: environment.qt_version(),
            },
        })
    }

    /// Active plugins, plus a stub for each expected plugin that is missing.
    fn plugins(&self) -> BTreeMap<String, PluginEntry> {
        let backend = self.host.backend.as_ref();
        let mut plugins: BTreeMap<String, PluginEntry> = backend
            .list_plugins()
            .into_iter()
            .map(|id| {
                let entry = PluginEntry::Found(describe_plugin(backend, &id));
                (id, entry)
            })
            .collect();

        for expected in EXPECTED_PLUGINS {
            plugins
                .entry(expected.to_string())
                .or_insert_with(PluginEntry::missing);
        }
        plugins
    }

    fn services(&self) -> Vec<String> {
        EXPECTED_SERVICES
            .iter()
            .filter(|name| self.host.services.get_service(name).is_some())
            .map(|name| name.to_string())
            .collect()
    }
}

/// `None` unless asked for with `CHECK_CUSTOM_HEADERS`; then whether the
/// marker header reached the server.
pub fn support_custom_headers(ctx: &RequestContext) -> Option<bool> {
    if !to_bool(ctx.parameter(CHECK_CUSTOM_HEADERS), false) {
        return None;
    }
    Some(ctx.has_header(CUSTOM_HEADER))
}

impl ApiHandler for ServerInfoHandler {
    fn path(&self) -> &Regex {
        &self.path
    }

    fn summary(&self) -> &str {
        "Server information"
    }

    fn description(&self) -> &str {
        "Get info about the current QGIS server"
    }

    fn operation_id(&self) -> &str {
        "server"
    }

    fn link_title(&self) -> &str {
        "Handler Lizmap API server info"
    }

    fn link_type(&self) -> LinkType {
        LinkType::Data
    }

    fn authorize(&self, _ctx: &RequestContext) -> Result<(), LizmapError> {
        if !check_environment_variable(self.env.as_ref(), &self.reveal_settings_env) {
            return Err(LizmapError::service("Bad request error", "Invalid request", 404));
        }
        Ok(())
    }

    fn parameters(&self) -> Vec<QueryParameter> {
        vec![QueryParameter::new(
            CHECK_CUSTOM_HEADERS,
            false,
            ParameterType::String,
            "If we check custom headers",
        )]
    }

    fn handle(&self, ctx: &RequestContext) -> Result<Value, LizmapError> {
        let info = self.collect(ctx)?;
        Ok(serde_json::to_value(info)?)
    }
}
