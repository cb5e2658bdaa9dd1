//! Conversion handler

use super::ExtractQuery;
use crate::api::AppState;
use crate::error::Error;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};

/// GET / - Convert a shared shortcut to JSON or XML
#[utoipa::path(
    get,
    path = "/",
    tag = "extract",
    params(ExtractQuery),
    responses(
        (status = 200, description = "Converted document as an attachment", content_type = "application/json", body = String),
        (status = 400, description = "Invalid input, upstream failure or conversion failure", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn extract(State(state): State<AppState>, Query(query): Query<ExtractQuery>) -> Response {
    let Some(link) = query.shortcuturl else {
        return Error::InvalidInput("missing required query parameter 'shortcuturl'".to_string())
            .into_response();
    };

    state.service.extract(&link, &query.fmt).await.into_response()
}
