use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handler::ApiHandler;
use crate::handlers::{self, landing::LANDING_PATH};
use crate::response::{self, OutputFormat};
use axum::{
    Router as AxumRouter,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::get,
};
use lizmap_core::config::ApiConfig;
use lizmap_core::{EnvSource, LizmapConfig, LizmapError};
use lizmap_host::Host;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Shared state for the API.
#[derive(Clone)]
pub struct ApiState {
    pub handlers: Arc<Vec<Arc<dyn ApiHandler>>>,
}

impl ApiState {
    pub fn new(host: Arc<Host>, env: Arc<dyn EnvSource>, config: &LizmapConfig) -> Self {
        let handlers = handlers::default_handlers(
            host,
            env,
            &config.security.reveal_settings_env,
            &config.api_prefix(),
        );
        Self::with_handlers(handlers)
    }

    pub fn with_handlers(handlers: Vec<Arc<dyn ApiHandler>>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    /// First handler whose pattern matches `path`.
    pub fn find(&self, path: &str) -> Option<&Arc<dyn ApiHandler>> {
        self.handlers.iter().find(|h| h.path().is_match(path))
    }
}

/// Build the Axum router with every API route below `prefix`.
pub fn build_api_router(state: ApiState, prefix: &str) -> AxumRouter {
    let root = if prefix.is_empty() { "/" } else { prefix };
    let mut router = AxumRouter::new()
        .route(root, get(landing))
        .route(&format!("{prefix}/{{*path}}"), get(dispatch));
    if !prefix.is_empty() {
        router = router.route(&format!("{prefix}/"), get(landing));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the API server, until `shutdown` resolves.
pub async fn start_api(
    config: ApiConfig,
    prefix: String,
    state: ApiState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    if !config.enabled {
        info!("Lizmap API disabled");
        return Ok(());
    }

    let app = build_api_router(state, &prefix);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, prefix = %prefix, "Starting Lizmap API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Lizmap API stopped");
    Ok(())
}

async fn landing(
    State(state): State<ApiState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    run(&state, RequestContext::new(LANDING_PATH, query, headers))
}

async fn dispatch(
    State(state): State<ApiState>,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    run(&state, RequestContext::new(path, query, headers))
}

/// Authorize → validate → negotiate → handle → write, for the handler
/// matching the context path.
fn run(state: &ApiState, ctx: RequestContext) -> Result<Response, ApiError> {
    let handler = state.find(&ctx.path).ok_or_else(|| {
        LizmapError::service("Not found", format!("No handler for '{}'", ctx.path), 404)
    })?;
    debug!(path = %ctx.path, operation = handler.operation_id(), "Dispatching request");

    handler.authorize(&ctx)?;
    for parameter in handler.parameters() {
        parameter.validate(&ctx)?;
    }
    let format = OutputFormat::negotiate(&ctx)?;
    let document = handler.handle(&ctx)?;
    Ok(response::write(&document, format, handler.summary())?)
}
