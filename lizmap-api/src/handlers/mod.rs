pub mod landing;
pub mod server_info;

use crate::handler::ApiHandler;
use landing::LandingHandler;
use lizmap_core::EnvSource;
use lizmap_host::Host;
use server_info::ServerInfoHandler;
use std::sync::Arc;

/// Every handler of the API, landing page last.
pub fn default_handlers(
    host: Arc<Host>,
    env: Arc<dyn EnvSource>,
    reveal_settings_env: &str,
    prefix: &str,
) -> Vec<Arc<dyn ApiHandler>> {
    let mut handlers: Vec<Arc<dyn ApiHandler>> = vec![Arc::new(ServerInfoHandler::new(
        host,
        env,
        reveal_settings_env,
    ))];
    let landing = LandingHandler::new(prefix, &handlers);
    handlers.push(Arc::new(landing));
    handlers
}
