//! # vidmerge
//!
//! HTTP service that joins two remote videos into one file without re-encoding.
//!
//! A `POST /merge` request names two source URLs. Both are downloaded into a
//! private working area, concatenated with ffmpeg's concat demuxer in stream
//! copy mode, and the result is published under a random name in the output
//! directory. The file is served read-only at `<files_prefix>/<name>.mp4` and
//! deleted again after a short delay.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidmerge::{Config, MergeRequest, MergeService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let service = MergeService::new(config).await?;
//!
//!     let response = service
//!         .merge(
//!             &MergeRequest::new("https://example.com/a.mp4", "https://example.com/b.mp4"),
//!             Some("http://localhost:8000"),
//!         )
//!         .await?;
//!     println!("merged file: {}", response.url);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Source downloads
pub mod fetch;
/// Expiry timers and output directory sweeps
pub mod janitor;
/// Media concatenation backends
pub mod media;
/// Merge orchestration
pub mod merger;
/// Request, response and output types
pub mod types;
/// Utility functions
pub mod utils;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, DownloadError, Error, ErrorDetail, Result, ToHttpStatus};
pub use janitor::ExpiryScheduler;
pub use media::{ConcatHandler, FfmpegConcatHandler, UnavailableConcatHandler};
pub use merger::MergeService;
pub use types::{MergeRequest, MergeResponse, OutputFile};

/// Helper function to run the API server with graceful signal handling.
///
/// Serves until a termination signal arrives, then stops accepting
/// connections and cancels pending deletion timers.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use vidmerge::{Config, MergeService, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let service = MergeService::new(config).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(service).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(service: MergeService) -> Result<()> {
    let config = service.config.clone();
    api::start_api_server(std::sync::Arc::new(service), config).await
}

/// Resolve on SIGINT/SIGTERM (Ctrl+C on non-unix targets)
pub(crate) async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT signal (Ctrl+C)"),
        _ = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
