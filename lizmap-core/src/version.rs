//! Parsing of the host's version string, e.g. `3.16.0-Hannover`.

/// First release reporting a usable dev-version marker.
pub const DEV_VERSION_MIN_INT: u32 = 31200;

/// Dev-version marker of packaged (non git) builds.
pub const EXPORTED_DEV_VERSION: &str = "exported";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QgisVersion {
    /// Numeric part, `3.16.0`.
    pub version: String,
    /// Release codename, `Hannover`. Empty when the string carries none.
    pub name: String,
    /// Integer form, `31600`.
    pub version_int: u32,
    dev_version: String,
}

impl QgisVersion {
    pub fn parse(full: &str, version_int: u32, dev_version: &str) -> Self {
        let mut parts = full.split('-');
        let version = parts.next().unwrap_or_default().to_string();
        let name = parts.next().unwrap_or_default().to_string();
        Self {
            version,
            name,
            version_int,
            dev_version: dev_version.to_string(),
        }
    }

    /// Release tag in the QGIS git repository, `final-3_16_0`.
    ///
    /// Empty when the version string is not a named release.
    pub fn tag(&self) -> String {
        self.try_tag().unwrap_or_default()
    }

    fn try_tag(&self) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        let numeric = self
            .version
            .split('.')
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        if !numeric {
            return None;
        }
        Some(format!("final-{}", self.version.replace('.', "_")))
    }

    /// Commit of a development build, empty for packaged releases.
    pub fn commit_id(&self) -> String {
        if self.version_int >= DEV_VERSION_MIN_INT && self.dev_version != EXPORTED_DEV_VERSION {
            self.dev_version.clone()
        } else {
            String::new()
        }
    }
}

/// `3.16.0` → `31600`. `None` when the string is not `major.minor[.patch]`.
pub fn version_int_from(numeric: &str) -> Option<u32> {
    let mut parts = numeric.split('.').map(|p| p.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next()??;
    let patch = match parts.next() {
        Some(p) => p?,
        None => 0,
    };
    major
        .checked_mul(10000)?
        .checked_add(minor.checked_mul(100)?)?
        .checked_add(patch)
}
