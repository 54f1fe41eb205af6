//! REST API server module
//!
//! Exposes the merge endpoint, static serving of produced files, and a few
//! system endpoints (health, OpenAPI document, Swagger UI).

use crate::{Config, MergeService, Result};
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
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
/// ## Merging
/// - `POST /merge` - Download two videos and concatenate them
/// - `GET <files_prefix>/<name>.mp4` - Produced files (read-only, until they expire)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<MergeService>, config: Arc<Config>) -> Router {
    let state = AppState::new(service);

    let router = Router::new()
        // Merging
        .route("/merge", post(routes::merge_videos))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        // Produced files
        .nest_service(
            &config.files_prefix(),
            ServeDir::new(&config.storage.output_dir),
        );

    // Swagger UI carries its own copy of the document on a separate path so it
    // does not collide with /openapi.json above
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// CORS layer for the configured origins; "*" (or nothing) allows any origin
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Start the API server on the configured bind address.
///
/// Runs until SIGINT/SIGTERM (Ctrl+C elsewhere), then stops accepting
/// connections, lets in-flight requests finish, and shuts the merge service
/// down.
///
/// # Example
///
/// ```no_run
/// use vidmerge::{Config, MergeService};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let service = Arc::new(MergeService::new((*config).clone()).await?);
///
/// // Blocks until a termination signal arrives
/// vidmerge::api::start_api_server(service, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(service: Arc<MergeService>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, service, config, crate::wait_for_signal()).await
}

/// Serve the API on an already bound listener until `shutdown` resolves
///
/// Pending deletion timers are cancelled once the server has stopped.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<MergeService>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(address) = listener.local_addr() {
        tracing::info!(
            address = %address,
            files_prefix = %config.files_prefix(),
            "API server listening"
        );
    }

    let app = create_router(service.clone(), config);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()));

    service.shutdown().await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "API server failed");
    }
    tracing::info!("API server stopped");
    served
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
