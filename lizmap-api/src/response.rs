//! Response writer shared by every handler: picks JSON or HTML and renders
//! the handler's document in it.

use crate::context::RequestContext;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use lizmap_core::LizmapError;
use serde_json::Value;
use tera::{Context, Tera};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Html,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Html => "text/html; charset=utf-8",
        }
    }

    /// `f` query parameter first, then the `Accept` header, JSON by default.
    pub fn negotiate(ctx: &RequestContext) -> Result<Self, LizmapError> {
        if let Some(f) = ctx.parameter("f") {
            return match f.to_lowercase().as_str() {
                "json" | "application/json" => Ok(OutputFormat::Json),
                "html" | "text/html" => Ok(OutputFormat::Html),
                other => Err(LizmapError::InvalidParameter {
                    name: "f".into(),
                    reason: format!("unsupported output format '{other}'"),
                }),
            };
        }
        match ctx.header(header::ACCEPT.as_str()) {
            Some(accept) if accept.contains("text/html") => Ok(OutputFormat::Html),
            _ => Ok(OutputFormat::Json),
        }
    }
}

/// Serialize `document` in `format`.
pub fn write(document: &Value, format: OutputFormat, title: &str) -> Result<Response, LizmapError> {
    let body = match format {
        OutputFormat::Json => serde_json::to_string(document)?,
        OutputFormat::Html => render_html(title, &serde_json::to_string_pretty(document)?)?,
    };
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, format.content_type())],
        body,
    )
        .into_response())
}

/// Page wrapping a pretty-printed document, rendered with autoescape on.
const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");

fn render_html(title: &str, pretty_json: &str) -> Result<String, LizmapError> {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("body", pretty_json);
    Tera::one_off(PAGE_TEMPLATE, &context, true)
        .map_err(|e| LizmapError::service("Internal server error", e.to_string(), 500))
}
