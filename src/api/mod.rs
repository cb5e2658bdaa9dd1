//! REST API server module
//!
//! Exposes the conversion pipeline over HTTP, plus health, capability and
//! OpenAPI endpoints.

use crate::config::ApiConfig;
use crate::{Config, ConversionService, Result};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `GET /?shortcuturl=..&fmt=json|xml` - Convert a shared shortcut
/// - `GET /health` - Health check
/// - `GET /capabilities` - Available conversion strategies
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<ConversionService>, config: Arc<Config>) -> Router {
    let state = AppState::new(service);

    let router = Router::new()
        .route("/", get(routes::extract))
        .route("/health", get(routes::health_check))
        .route("/capabilities", get(routes::get_capabilities))
        .route("/openapi.json", get(routes::openapi_spec));

    // SwaggerUi serves its own copy of the document next to the UI
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(build_cors_layer(&config.api))
    } else {
        router
    }
}

/// Build a CORS layer from the configured origins, methods and headers
///
/// A `"*"` entry (or an empty list) allows anything for that dimension.
/// Entries that are not valid header values are skipped.
fn build_cors_layer(api: &ApiConfig) -> CorsLayer {
    let origins = if allows_any(&api.cors_origins) {
        AllowOrigin::from(Any)
    } else {
        let allowed: Vec<HeaderValue> = api
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(allowed)
    };

    let methods = if allows_any(&api.cors_methods) {
        AllowMethods::from(Any)
    } else {
        let allowed: Vec<Method> = api
            .cors_methods
            .iter()
            .filter_map(|m| m.trim().to_uppercase().parse().ok())
            .collect();
        AllowMethods::list(allowed)
    };

    let headers = if allows_any(&api.cors_headers) {
        AllowHeaders::from(Any)
    } else {
        let allowed: Vec<HeaderName> = api
            .cors_headers
            .iter()
            .filter_map(|h| h.trim().parse().ok())
            .collect();
        AllowHeaders::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}

fn allows_any(entries: &[String]) -> bool {
    entries.is_empty() || entries.iter().any(|e| e.trim() == "*")
}

/// Start the API server on the configured bind address.
///
/// Runs until SIGINT/SIGTERM (Ctrl+C elsewhere), then lets in-flight
/// requests finish before returning.
///
/// # Example
///
/// ```no_run
/// use shortcut_extract::{Config, ConversionService};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let service = Arc::new(ConversionService::from_config(&config)?);
///
/// // Start API server (blocks until shutdown)
/// shortcut_extract::api::start_api_server(service, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(service: Arc<ConversionService>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(service, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
