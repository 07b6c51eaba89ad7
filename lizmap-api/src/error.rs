use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use lizmap_core::LizmapError;

/// Wraps [`LizmapError`] so it can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub LizmapError);

impl From<LizmapError> for ApiError {
    fn from(err: LizmapError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(self.0.to_json())).into_response()
    }
}
