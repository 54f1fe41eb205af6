//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the vidmerge REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the vidmerge REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidmerge REST API",
        version = "0.1.0",
        description = "Downloads two videos, joins them without re-encoding, and serves the result for a short time",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Merging
        crate::api::routes::merge_videos,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::MergeRequest,
            crate::types::MergeResponse,
            crate::api::routes::HealthResponse,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "merge", description = "Video concatenation"),
        (name = "system", description = "Health and API documentation"),
    )
)]
pub struct ApiDoc;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in ["/merge", "/health", "/openapi.json"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }

    #[test]
    fn document_serializes_with_schemas() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &json["components"]["schemas"];
        assert!(schemas.get("MergeRequest").is_some());
        assert!(schemas.get("MergeResponse").is_some());
        assert!(schemas.get("ApiError").is_some());
    }
}
