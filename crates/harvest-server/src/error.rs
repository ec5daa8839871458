use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use harvest_core::error::AppError;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
///
/// Every failure is a one-line plain-text body; no attachment is sent.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_unreachable() => StatusCode::BAD_GATEWAY,
            AppError::NoMatches(_) | AppError::NoTabularData(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::info!(error = %self.0, %status, "Request rejected");
        }

        (status, self.0.user_message()).into_response()
    }
}
