//! HTTP responses for conversion results and errors
//!
//! Failures become a status code from [`ToHttpStatus`] and an
//! `{"error": "..."}` body; successes become a file download.

use crate::error::{ApiError, Error, ToHttpStatus};
use crate::types::ConversionOutcome;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

impl IntoResponse for ConversionOutcome {
    fn into_response(self) -> Response {
        match self {
            ConversionOutcome::Success(document) => {
                let disposition =
                    format!("attachment; filename=\"{}\"", document.suggested_filename);
                (
                    StatusCode::OK,
                    [
                        (header::CONTENT_TYPE, document.format.content_type().to_string()),
                        (header::CONTENT_DISPOSITION, disposition),
                    ],
                    document.content,
                )
                    .into_response()
            }
            ConversionOutcome::Failure { kind, message } => {
                let status_code = StatusCode::from_u16(kind.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status_code, Json(ApiError::new(message))).into_response()
            }
        }
    }
}
