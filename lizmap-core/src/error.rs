use serde_json::json;
use thiserror::Error;

/// Unified error type for the Lizmap server info API.
#[derive(Error, Debug)]
pub enum LizmapError {
    /// Error surfaced to the client as-is, with its own code and HTTP status.
    #[error("{code}: {message}")]
    Service {
        code: String,
        message: String,
        status: u16,
    },

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Metadata key '{key}' missing for plugin {plugin}")]
    MetadataKeyMissing { plugin: String, key: String },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LizmapError {
    pub fn service(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        LizmapError::Service {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// Map to HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            LizmapError::Service { status, .. } => *status,
            LizmapError::PluginNotFound(_) => 404,
            LizmapError::MetadataKeyMissing { .. } => 404,
            LizmapError::InvalidParameter { .. } => 400,
            _ => 500,
        }
    }

    /// Short error code reported in the `error` field of the body.
    pub fn code(&self) -> &str {
        match self {
            LizmapError::Service { code, .. } => code,
            LizmapError::PluginNotFound(_) => "Plugin not found",
            LizmapError::MetadataKeyMissing { .. } => "Metadata not found",
            LizmapError::InvalidParameter { .. } => "Bad request error",
            _ => "Internal server error",
        }
    }

    /// Human readable part of the error, without the code prefix.
    pub fn message(&self) -> String {
        match self {
            LizmapError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// JSON error body.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": self.code(),
            "message": self.message(),
            "status": self.status_code(),
        })
    }
}
