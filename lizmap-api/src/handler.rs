use crate::context::RequestContext;
use lizmap_core::{LizmapError, to_bool};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Relation of a handler link, as advertised on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    #[serde(rename = "self")]
    SelfLink,
    Data,
    ServiceDoc,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::SelfLink => "self",
            LinkType::Data => "data",
            LinkType::ServiceDoc => "service_doc",
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Double,
    Boolean,
}

/// A query string parameter declared by a handler.
#[derive(Debug, Clone, Serialize)]
pub struct QueryParameter {
    pub name: &'static str,
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: &'static str,
}

impl QueryParameter {
    pub fn new(
        name: &'static str,
        required: bool,
        kind: ParameterType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            required,
            kind,
            description,
        }
    }

    /// Reject a missing required value or one that does not parse as `kind`.
    pub fn validate(&self, ctx: &RequestContext) -> Result<(), LizmapError> {
        let Some(value) = ctx.parameter(self.name) else {
            if self.required {
                return Err(self.invalid("missing required parameter"));
            }
            return Ok(());
        };

        let valid = match self.kind {
            ParameterType::String => true,
            ParameterType::Integer => value.parse::<i64>().is_ok(),
            ParameterType::Double => value.parse::<f64>().is_ok(),
            ParameterType::Boolean => {
                to_bool(Some(value), false)
                    || matches!(value.to_lowercase().as_str(), "no" | "false" | "f" | "0")
            }
        };
        if valid {
            Ok(())
        } else {
            Err(self.invalid(&format!("'{value}' is not a valid {:?}", self.kind)))
        }
    }

    fn invalid(&self, reason: &str) -> LizmapError {
        LizmapError::InvalidParameter {
            name: self.name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A handler mounted on the API, in the shape of the host's OGC API handlers.
pub trait ApiHandler: Send + Sync {
    /// Anchored pattern matched against the path below the API prefix.
    fn path(&self) -> &Regex;

    fn summary(&self) -> &str;

    fn description(&self) -> &str;

    fn operation_id(&self) -> &str;

    fn link_title(&self) -> &str;

    fn link_type(&self) -> LinkType;

    /// Access check, run before parameters are validated or a format is
    /// picked.
    fn authorize(&self, _ctx: &RequestContext) -> Result<(), LizmapError> {
        Ok(())
    }

    /// Query parameters checked before `handle` runs.
    fn parameters(&self) -> Vec<QueryParameter> {
        Vec::new()
    }

    fn handle(&self, ctx: &RequestContext) -> Result<Value, LizmapError>;
}

/// Href of a handler: its path pattern without anchors and escapes.
pub fn href_of(prefix: &str, pattern: &Regex) -> String {
    let raw = pattern.as_str().trim_start_matches('^').trim_end_matches('$');
    format!("{prefix}/{}", raw.replace('\\', ""))
}
