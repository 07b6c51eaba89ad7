use std::collections::HashMap;
use tracing::error;

/// Source of environment values, read at request time.
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Convert a configuration or query value to a boolean.
///
/// Missing and empty values fall back to `default`. Anything else is true
/// only when it is one of `yes`, `true`, `t` or `1` (case-insensitive).
pub fn to_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) => matches!(v.to_lowercase().as_str(), "yes" | "true" | "t" | "1"),
    }
}

/// Check the server has been explicitly allowed to reveal its settings.
pub fn check_environment_variable(env: &dyn EnvSource, name: &str) -> bool {
    if to_bool(env.var(name).as_deref(), false) {
        return true;
    }
    error!(
        variable = %name,
        "The Lizmap API is currently not enabled. Please read the documentation how to enable \
         the Lizmap API on QGIS server side \
         https://docs.lizmap.com/current/en/install/pre_requirements.html#lizmap-server-plugin"
    );
    false
}
