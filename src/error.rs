//! Error types for vidmerge
//!
//! This module provides the error taxonomy for the merge pipeline, including:
//! - Domain-specific error types (validation, download, tool execution)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for vidmerge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidmerge
///
/// Every failure is local to a single merge request. The API layer is the only
/// place that turns these into HTTP status codes (see [`ToHttpStatus`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "OUTPUT_DIR")
        key: Option<String>,
    },

    /// Malformed request input, rejected before any I/O
    #[error("validation error: {0}")]
    Validation(String),

    /// Fetching one of the source videos failed
    #[error("download of input {input} failed: {source}")]
    Download {
        /// Which input failed (1 for `url1`, 2 for `url2`)
        input: u8,
        /// What went wrong while fetching it
        #[source]
        source: DownloadError,
    },

    /// The external media tool exited with a nonzero status
    #[error("ffmpeg failed (exit code {}): {output}", exit_code_label(.exit_code))]
    ToolExecution {
        /// Process exit code, `None` when killed by a signal
        exit_code: Option<i32>,
        /// Captured stdout and stderr, already truncated
        output: String,
    },

    /// The external tool could not be run at all (missing binary, spawn failure)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Errors raised while fetching one of the source videos
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connection, TLS, or body read failure
    #[error("failed to fetch {url}: {reason}")]
    Transport {
        /// The URL being fetched
        url: String,
        /// The underlying transport error
        reason: String,
    },

    /// The remote server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL being fetched
        url: String,
        /// The HTTP status code returned by the remote server
        status: u16,
    },

    /// No data arrived within the configured timeout
    #[error("timed out after {seconds}s fetching {url}")]
    Timeout {
        /// The URL being fetched
        url: String,
        /// The timeout that elapsed, in seconds
        seconds: u64,
    },

    /// The source exceeded the configured byte ceiling
    #[error("{url} exceeds the {limit} byte download limit")]
    TooLarge {
        /// The URL being fetched
        url: String,
        /// The configured ceiling in bytes
        limit: u64,
    },

    /// Writing the downloaded body to disk failed
    #[error("failed to write {url} to disk: {reason}")]
    Write {
        /// The URL being fetched
        url: String,
        /// The underlying I/O error
        reason: String,
    },
}

impl DownloadError {
    /// The URL whose download failed
    pub fn url(&self) -> &str {
        match self {
            DownloadError::Transport { url, .. }
            | DownloadError::Status { url, .. }
            | DownloadError::Timeout { url, .. }
            | DownloadError::TooLarge { url, .. }
            | DownloadError::Write { url, .. } => url,
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "payload_too_large",
///     "message": "download of input 1 failed: https://host/a.mp4 exceeds the 524288000 byte download limit",
///     "details": {
///       "input": 1,
///       "url": "https://host/a.mp4",
///       "limit_bytes": 524288000
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "download_failed", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the caller handed us something we could not fetch
            Error::Config { .. } => 400,
            Error::Download {
                source: DownloadError::TooLarge { .. },
                ..
            } => 413,
            Error::Download { .. } => 400,

            // 422 Unprocessable Entity - input was well-formed but unusable
            Error::Validation(_) => 422,
            Error::ToolExecution { .. } => 422,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 503 Service Unavailable
            Error::ExternalTool(_) => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Download {
                source: DownloadError::TooLarge { .. },
                ..
            } => "payload_too_large",
            Error::Download { .. } => "download_failed",
            Error::ToolExecution { .. } => "tool_execution_failed",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let mut api_error = ApiError::new(error.error_code(), error.to_string());

        let details = match &error {
            Error::Download { input, source } => {
                let mut details = serde_json::json!({
                    "input": input,
                    "url": source.url(),
                });
                match source {
                    DownloadError::TooLarge { limit, .. } => {
                        details["limit_bytes"] = serde_json::json!(limit);
                    }
                    DownloadError::Status { status, .. } => {
                        details["upstream_status"] = serde_json::json!(status);
                    }
                    _ => {}
                }
                Some(details)
            }
            Error::ToolExecution { exit_code, output } => Some(serde_json::json!({
                "exit_code": exit_code,
                "output": output,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        api_error.error.details = details;
        api_error
    }
}
