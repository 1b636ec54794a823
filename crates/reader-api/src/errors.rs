//! §7 Error taxonomy mapped onto HTTP, in the style of
//! `riptide-api::errors::ApiError` but with `text/plain` bodies (§6:
//! "Responses are `text/plain`... Errors: 400... 404... 500").

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reader_types::ReaderError;

pub struct ApiError(pub ReaderError);

impl From<ReaderError> for ApiError {
    fn from(err: ReaderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            ReaderError::ParamValidation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ReaderError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "Invalid URL or TLD".to_string()),
            ReaderError::NoContent => (StatusCode::NOT_FOUND, "No content available".to_string()),
            ReaderError::DownstreamFailure(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ReaderError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ReaderError::Json(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ReaderError::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ReaderError::Other(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!(error = %self.0, "request failed"),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => tracing::warn!(error = %self.0, "request rejected"),
            _ => {}
        }

        (status, body).into_response()
    }
}
