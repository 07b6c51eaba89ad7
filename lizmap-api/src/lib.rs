pub mod context;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use error::ApiError;
pub use handler::{ApiHandler, LinkType, ParameterType, QueryParameter};
pub use server::{ApiState, build_api_router, start_api};
