//! Version metadata of Py-QGIS-Server, the optional alternate runtime.

use lizmap_core::LizmapError;
use lizmap_core::config::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::error;

pub const NOT_USED: &str = "not used";
pub const FETCH_ERROR: &str = "error while fetching py-qgis-server version";

const PRE_RELEASE_MARKERS: [&str; 4] = ["pre", "alpha", "beta", "rc"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRuntimeInfo {
    pub found: bool,
    pub version: String,
    pub build_id: Option<u64>,
    pub commit_id: Option<String>,
    pub is_stable: bool,
}

impl ServerRuntimeInfo {
    fn placeholder(version: &str) -> Self {
        Self {
            found: false,
            version: version.to_string(),
            build_id: None,
            commit_id: None,
            is_stable: false,
        }
    }

    pub fn not_used() -> Self {
        Self::placeholder(NOT_USED)
    }

    pub fn fetch_error() -> Self {
        Self::placeholder(FETCH_ERROR)
    }
}

/// `version.json`/`manifest.yaml` shipped with Py-QGIS-Server.
#[derive(Debug, Deserialize)]
struct RuntimeManifest {
    version: String,
    #[serde(default)]
    buildid: Option<u64>,
    #[serde(default)]
    commitid: Option<String>,
}

/// True unless the version carries a pre-release marker.
pub fn is_stable_release(version: &str) -> bool {
    !PRE_RELEASE_MARKERS.iter().any(|m| version.contains(m))
}

fn load_manifest(path: Option<&Path>) -> Result<RuntimeManifest, LizmapError> {
    let path = path.ok_or_else(|| LizmapError::Manifest("no py-qgis-server manifest configured".into()))?;
    let text = std::fs::read_to_string(path)?;
    let manifest: RuntimeManifest = serde_yaml::from_str(&text)?;
    Ok(manifest)
}

/// Probe the alternate runtime. Never fails: errors are logged and reported
/// in place of the version.
pub fn probe(kind: BackendKind, manifest: Option<&Path>) -> ServerRuntimeInfo {
    if kind != BackendKind::PyQgisServer {
        return ServerRuntimeInfo::not_used();
    }

    match load_manifest(manifest) {
        Ok(m) => ServerRuntimeInfo {
            found: true,
            is_stable: is_stable_release(&m.version),
            version: m.version,
            build_id: m.buildid,
            commit_id: m.commitid,
        },
        Err(e) => {
            error!(error = %e, "error while fetching py-qgis-server version");
            ServerRuntimeInfo::fetch_error()
        }
    }
}
