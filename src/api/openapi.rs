//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the shortcut-extract
//! REST API using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the shortcut-extract REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "shortcut-extract REST API",
        version = "0.1.0",
        description = "Resolves shared shortcut links and converts their binary property lists to JSON or XML",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3333", description = "Local development server")
    ),
    paths(
        crate::api::routes::extract,
        crate::api::routes::get_capabilities,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::TargetFormat,
        crate::types::Capabilities,
        crate::types::ExternalToolInfo,
        crate::error::ErrorKind,
        crate::error::ApiError,
    )),
    tags(
        (name = "extract", description = "Shortcut conversion - Fetch a shared shortcut and return it as JSON or XML"),
        (name = "system", description = "System endpoints - Health checks, capabilities, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
