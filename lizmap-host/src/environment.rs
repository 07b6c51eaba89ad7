use crate::services::ServiceDescriptor;
use lizmap_core::LizmapError;
use lizmap_core::version::{EXPORTED_DEV_VERSION, version_int_from};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Facts about the host process and the native libraries it links against.
pub trait EnvironmentInspector: Send + Sync {
    /// Full version string, `3.16.0-Hannover`.
    fn qgis_version(&self) -> String;
    fn qgis_version_int(&self) -> u32;
    /// Git commit of a dev build, `exported` for packaged builds.
    fn dev_version(&self) -> String;
    /// Font families available to the rendering engine.
    fn font_families(&self) -> Vec<String>;
    fn gdal_version(&self) -> String;
    fn python_version(&self) -> String;
    fn qt_version(&self) -> String;
}

/// YAML description of the host.
///
/// ```yaml
/// qgis:
///   version: "3.34.4-Prizren"
///   version_int: 33404
///   dev_version: exported
/// services:
///   - name: WMS
///     version: "1.3.0"
/// fonts: ["DejaVu Sans", "Noto Sans"]
/// libraries:
///   gdal: "3080400"
///   python: "3.11.2"
///   qt: "5.15.8"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostManifest {
    #[serde(default)]
    pub qgis: QgisRelease,
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub libraries: Libraries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QgisRelease {
    #[serde(default = "default_unknown")]
    pub version: String,
    /// Derived from `version` when omitted.
    #[serde(default)]
    pub version_int: Option<u32>,
    #[serde(default = "default_dev_version")]
    pub dev_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Libraries {
    #[serde(default = "default_unknown")]
    pub gdal: String,
    #[serde(default = "default_unknown")]
    pub python: String,
    #[serde(default = "default_unknown")]
    pub qt: String,
}

fn default_unknown() -> String { "unknown".into() }
fn default_dev_version() -> String { EXPORTED_DEV_VERSION.into() }

impl Default for QgisRelease {
    fn default() -> Self {
        Self {
            version: default_unknown(),
            version_int: None,
            dev_version: default_dev_version(),
        }
    }
}

impl Default for Libraries {
    fn default() -> Self {
        Self {
            gdal: default_unknown(),
            python: default_unknown(),
            qt: default_unknown(),
        }
    }
}

impl HostManifest {
    pub fn load(path: &Path) -> Result<Self, LizmapError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, LizmapError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

impl EnvironmentInspector for HostManifest {
    fn qgis_version(&self) -> String {
        self.qgis.version.clone()
    }

    fn qgis_version_int(&self) -> u32 {
        self.qgis.version_int.unwrap_or_else(|| {
            let numeric = self.qgis.version.split('-').next().unwrap_or_default();
            version_int_from(numeric).unwrap_or(0)
        })
    }

    fn dev_version(&self) -> String {
        self.qgis.dev_version.clone()
    }

    fn font_families(&self) -> Vec<String> {
        self.fonts.clone()
    }

    fn gdal_version(&self) -> String {
        self.libraries.gdal.clone()
    }

    fn python_version(&self) -> String {
        self.libraries.python.clone()
    }

    fn qt_version(&self) -> String {
        self.libraries.qt.clone()
    }
}
