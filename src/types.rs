//! Request, response and output types for the merge pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use utoipa::ToSchema;

/// Body of `POST /merge`
///
/// Both fields must be absolute `http` or `https` URLs. Validation happens in
/// [`MergeRequest::validate`] before any network or disk I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MergeRequest {
    /// First video, played first in the output
    #[schema(example = "https://example.com/a.mp4")]
    pub url1: String,
    /// Second video, appended after the first
    #[schema(example = "https://example.com/b.mp4")]
    pub url2: String,
}

impl MergeRequest {
    /// Create a request from two URL strings
    pub fn new(url1: impl Into<String>, url2: impl Into<String>) -> Self {
        Self {
            url1: url1.into(),
            url2: url2.into(),
        }
    }

    /// Parse both URLs, rejecting anything that is not absolute http(s)
    pub fn validate(&self) -> Result<ValidatedRequest> {
        Ok(ValidatedRequest {
            url1: parse_source_url("url1", &self.url1)?,
            url2: parse_source_url("url2", &self.url2)?,
        })
    }
}

/// A [`MergeRequest`] whose URLs have been parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// First source
    pub url1: Url,
    /// Second source
    pub url2: Url,
}

impl ValidatedRequest {
    /// Sources in playback order
    pub fn sources(&self) -> [&Url; 2] {
        [&self.url1, &self.url2]
    }
}

fn parse_source_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Validation(format!("{field} is not a valid URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Validation(format!(
            "{field} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::Validation(format!("{field} has no host")));
    }

    Ok(url)
}

/// Successful response of `POST /merge`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MergeResponse {
    /// Always "ok"
    #[schema(example = "ok")]
    pub status: String,
    /// Public URL of the merged file
    #[schema(example = "https://media.example.com/files/0f3c9d3a5b7e4d2c8a1b6e9f0c2d4e6a.mp4")]
    pub url: String,
    /// Seconds until the file is deleted
    #[schema(example = 60)]
    pub expires_in_seconds: u64,
    /// Size of the merged file in bytes
    pub size_bytes: u64,
}

impl MergeResponse {
    /// Build the response for a produced file
    pub fn new(url: String, output: &OutputFile) -> Self {
        Self {
            status: "ok".to_string(),
            url,
            expires_in_seconds: output.expires_in.as_secs(),
            size_bytes: output.size_bytes,
        }
    }
}

/// A merged file published in the output directory
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// File name, `<32 hex chars>.mp4`
    pub name: String,
    /// Absolute or config-relative location on disk
    pub path: PathBuf,
    /// Path under which the static file server exposes it, e.g. `/files/<name>`
    pub served_path: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Delay after publication at which the file is deleted
    pub expires_in: Duration,
}
