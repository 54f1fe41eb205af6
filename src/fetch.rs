//! Streaming download of source videos
//!
//! [`Fetcher`] owns a pooled HTTP client and writes response bodies to disk
//! chunk by chunk, enforcing a byte ceiling and a per-read timeout so a stalled
//! transfer cannot hang a request forever. Partial files are left behind on
//! failure; callers download into a scoped working area that removes them.

use crate::config::DownloadConfig;
use crate::error::{DownloadError, Error, Result};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// HTTP downloader with size and timeout limits
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: u64,
    read_timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher from download settings
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("vidmerge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
            read_timeout: config.read_timeout,
        })
    }

    /// Stream `url` into `dest`, returning the number of bytes written
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Status`] for a non-2xx response
    /// - [`DownloadError::TooLarge`] when `Content-Length` or the streamed byte
    ///   count exceeds the ceiling; the transfer is aborted immediately
    /// - [`DownloadError::Timeout`] when the headers or any body read take longer
    ///   than the read timeout
    /// - [`DownloadError::Transport`] / [`DownloadError::Write`] otherwise
    pub async fn download_to(
        &self,
        url: &Url,
        dest: &Path,
    ) -> std::result::Result<u64, DownloadError> {
        let url_str = url.as_str();

        let mut response = self
            .with_read_timeout(url_str, self.client.get(url.clone()).send())
            .await?
            .map_err(|e| transport_error(url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url_str.to_string(),
                status: status.as_u16(),
            });
        }

        let announced = response.content_length().unwrap_or(0);
        if announced > self.max_bytes {
            tracing::warn!(
                url = %url_str,
                announced,
                limit = self.max_bytes,
                "refusing oversized download"
            );
            return Err(self.too_large(url_str));
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| write_error(url_str, e))?;
        let mut written: u64 = 0;

        while let Some(chunk) = self
            .with_read_timeout(url_str, response.chunk())
            .await?
            .map_err(|e| transport_error(url_str, e))?
        {
            written += chunk.len() as u64;
            if written > self.max_bytes {
                tracing::warn!(
                    url = %url_str,
                    written,
                    limit = self.max_bytes,
                    "aborting download that exceeded the size limit"
                );
                return Err(self.too_large(url_str));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| write_error(url_str, e))?;
        }

        file.flush().await.map_err(|e| write_error(url_str, e))?;

        tracing::debug!(url = %url_str, bytes = written, dest = ?dest, "download complete");
        Ok(written)
    }

    async fn with_read_timeout<F, T>(
        &self,
        url: &str,
        fut: F,
    ) -> std::result::Result<T, DownloadError>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::time::timeout(self.read_timeout, fut)
            .await
            .map_err(|_| DownloadError::Timeout {
                url: url.to_string(),
                seconds: self.read_timeout.as_secs(),
            })
    }

    fn too_large(&self, url: &str) -> DownloadError {
        DownloadError::TooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        }
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> DownloadError {
    let reason = if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    DownloadError::Transport {
        url: url.to_string(),
        reason,
    }
}

fn write_error(url: &str, e: std::io::Error) -> DownloadError {
    DownloadError::Write {
        url: url.to_string(),
        reason: e.to_string(),
    }
}
