use http::HeaderMap;
use std::collections::HashMap;

/// What a handler sees of the incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Path below the API prefix, without leading slash.
    pub path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(path: impl Into<String>, query: HashMap<String, String>, headers: HeaderMap) -> Self {
        // Parameter names are case-insensitive, as on the host.
        let query = query
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Self {
            path: path.into(),
            query,
            headers,
        }
    }

    /// Query parameter, looked up case-insensitively.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.query.get(&name.to_uppercase()).map(|v| v.as_str())
    }

    /// Request header value. Non-ASCII values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }
}
