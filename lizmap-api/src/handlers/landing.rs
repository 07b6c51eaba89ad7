use crate::context::RequestContext;
use crate::handler::{ApiHandler, LinkType, QueryParameter, href_of};
use lizmap_core::LizmapError;
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Sub-path served by the landing page; the bare prefix maps here too.
pub const LANDING_PATH: &str = "index.json";

#[derive(Debug, Clone, Serialize)]
pub struct HandlerLink {
    pub href: String,
    pub rel: LinkType,
    pub title: String,
    pub summary: String,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub parameters: Vec<QueryParameter>,
}

impl HandlerLink {
    pub fn of(prefix: &str, handler: &dyn ApiHandler) -> Self {
        Self {
            href: href_of(prefix, handler.path()),
            rel: handler.link_type(),
            title: handler.link_title().to_string(),
            summary: handler.summary().to_string(),
            description: handler.description().to_string(),
            operation_id: handler.operation_id().to_string(),
            parameters: handler.parameters(),
        }
    }
}

/// Lists the other handlers. Reveals nothing about the host, so it is not
/// guarded by the environment check.
pub struct LandingHandler {
    links: Vec<HandlerLink>,
    self_href: String,
    path: Regex,
}

impl LandingHandler {
    pub fn new(prefix: &str, handlers: &[Arc<dyn ApiHandler>]) -> Self {
        Self {
            links: handlers
                .iter()
                .map(|h| HandlerLink::of(prefix, h.as_ref()))
                .collect(),
            self_href: format!("{prefix}/{LANDING_PATH}"),
            path: Regex::new(r"^index\.json$").expect("static pattern"),
        }
    }
}

impl ApiHandler for LandingHandler {
    fn path(&self) -> &Regex {
        &self.path
    }

    fn summary(&self) -> &str {
        "Lizmap API"
    }

    fn description(&self) -> &str {
        "Handlers available on the Lizmap API"
    }

    fn operation_id(&self) -> &str {
        "landing"
    }

    fn link_title(&self) -> &str {
        "Lizmap API landing page"
    }

    fn link_type(&self) -> LinkType {
        LinkType::ServiceDoc
    }

    fn handle(&self, _ctx: &RequestContext) -> Result<Value, LizmapError> {
        let mut links = vec![json!({
            "href": self.self_href,
            "rel": LinkType::SelfLink,
            "title": self.link_title(),
        })];
        for link in &self.links {
            links.push(serde_json::to_value(link)?);
        }
        Ok(json!({
            "title": self.summary(),
            "description": self.description(),
            "version": env!("CARGO_PKG_VERSION"),
            "links": links,
        }))
    }
}
