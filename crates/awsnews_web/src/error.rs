use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use awsnews_core::Error;
use serde_json::json;
use tracing::warn;

/// Wraps a tool error so handlers can return it directly.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidArgument(_) | Error::UnsupportedDomain(_) => StatusCode::BAD_REQUEST,
            Error::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::UpstreamUnavailable(_) | Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, self.0);
        }
        let body = json!({
            "success": false,
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::InvalidArgument(rejection.body_text()))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
