//! Merge handler: download two sources, concatenate, publish.

use crate::api::AppState;
use crate::types::{MergeRequest, MergeResponse};
use crate::utils::request_base_url;
use axum::{Json, extract::State, http::HeaderMap};

/// POST /merge - Concatenate two videos
///
/// Blocks until the merged file is published. The returned URL stays valid for
/// `expires_in_seconds`.
#[utoipa::path(
    post,
    path = "/merge",
    tag = "merge",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Merged file published", body = MergeResponse),
        (status = 400, description = "A source could not be downloaded", body = crate::error::ApiError),
        (status = 413, description = "A source exceeds the download size limit", body = crate::error::ApiError),
        (status = 422, description = "Invalid URL, or ffmpeg rejected the inputs", body = crate::error::ApiError),
        (status = 503, description = "ffmpeg is not installed", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn merge_videos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MergeRequest>,
) -> crate::Result<Json<MergeResponse>> {
    let base = request_base_url(&headers);
    let response = state.service.merge(&request, base.as_deref()).await?;
    Ok(Json(response))
}
