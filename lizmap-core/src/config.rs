use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LizmapConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_addr")]
    pub addr: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Mount point of the API; handler paths are matched below it.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Which server runtime hosts the plugins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Plain QGIS Server (FCGI and friends), metadata read through qgis.utils.
    Qgis,
    /// Py-QGIS-Server, metadata read through its own plugin API.
    PyQgisServer,
}

/// Where to find the plugins and the description of the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    /// Directories scanned for `<plugin>/metadata.txt`.
    #[serde(default)]
    pub plugin_paths: Vec<PathBuf>,
    /// Explicit list of active plugins. All discovered plugins when unset.
    #[serde(default)]
    pub active_plugins: Option<Vec<String>>,
    /// YAML description of the host: version, services, fonts, libraries.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    /// Version manifest shipped with Py-QGIS-Server.
    #[serde(default)]
    pub py_qgis_server_manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Environment variable that must be true-like for the API to answer.
    #[serde(default = "default_reveal_settings_env")]
    pub reveal_settings_env: String,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_api_addr() -> String { "0.0.0.0:9180".into() }
fn default_true() -> bool { true }
fn default_prefix() -> String { "/lizmap".into() }
fn default_backend() -> BackendKind { BackendKind::Qgis }
fn default_reveal_settings_env() -> String { "QGIS_SERVER_LIZMAP_REVEAL_SETTINGS".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: default_api_addr(),
            enabled: true,
            prefix: default_prefix(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            plugin_paths: Vec::new(),
            active_plugins: None,
            manifest: None,
            py_qgis_server_manifest: None,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            reveal_settings_env: default_reveal_settings_env(),
        }
    }
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Qgis => "qgis",
            BackendKind::PyQgisServer => "py_qgis_server",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LizmapConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: LizmapConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("LIZMAP_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Prefix normalised to a leading slash and no trailing slash.
    pub fn api_prefix(&self) -> String {
        let trimmed = self.api.prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
