//! Turns [`Error`] into a JSON error response with its mapped status code.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DownloadError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_response() {
        let response = Error::Validation("url1: relative URL without a base".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn oversized_download_response_carries_limit() {
        let response = Error::Download {
            input: 2,
            source: DownloadError::TooLarge {
                url: "https://host/b.mp4".into(),
                limit: 1024,
            },
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "payload_too_large");
        assert_eq!(json["error"]["details"]["input"], 2);
        assert_eq!(json["error"]["details"]["limit_bytes"], 1024);
    }

    #[tokio::test]
    async fn upstream_status_response() {
        let response = Error::Download {
            input: 1,
            source: DownloadError::Status {
                url: "https://host/a.mp4".into(),
                status: 404,
            },
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "download_failed");
        assert_eq!(json["error"]["details"]["upstream_status"], 404);
        assert_eq!(json["error"]["details"]["url"], "https://host/a.mp4");
    }

    #[tokio::test]
    async fn tool_failure_response_includes_output() {
        let response = Error::ToolExecution {
            exit_code: Some(1),
            output: "Invalid data found when processing input".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "tool_execution_failed");
        assert_eq!(json["error"]["details"]["exit_code"], 1);
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("Invalid data found")
        );
    }

    #[tokio::test]
    async fn missing_tool_is_service_unavailable() {
        let response = Error::ExternalTool("ffmpeg not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
