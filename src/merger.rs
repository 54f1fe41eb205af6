//! Merge orchestration
//!
//! [`MergeService`] runs one merge per call: validate, sweep, download both
//! sources into a scoped working area, concatenate, publish into the output
//! directory, and arm the expiry timer. Concurrent calls share nothing except
//! the output directory; every call gets its own working area and a random
//! output name.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::janitor::{ExpiryScheduler, OUTPUT_EXTENSION, spawn_periodic_sweep, sweep_expired};
use crate::media::{ConcatHandler, FfmpegConcatHandler, UnavailableConcatHandler};
use crate::types::{MergeRequest, MergeResponse, OutputFile};
use crate::utils::{join_public_url, publish_file};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// File names of the downloaded sources inside a working area, in order
const INPUT_FILE_NAMES: [&str; 2] = ["1.mp4", "2.mp4"];

/// File name of the concatenation result inside a working area
const STAGED_OUTPUT_NAME: &str = "out.mp4";

/// Orchestrates download, concatenation, publication and expiry
pub struct MergeService {
    /// Service configuration
    pub config: Arc<Config>,
    fetcher: Fetcher,
    concat: Arc<dyn ConcatHandler>,
    expiry: ExpiryScheduler,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for MergeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeService")
            .field("config", &self.config)
            .field("concat", &self.concat.name())
            .finish_non_exhaustive()
    }
}

impl MergeService {
    /// Create a service using the configured or discovered ffmpeg binary
    ///
    /// When no ffmpeg is found the service still starts, but merges fail with
    /// [`Error::ExternalTool`].
    pub async fn new(config: Config) -> Result<Self> {
        let handler = resolve_concat_handler(&config);
        Self::with_handler(config, handler).await
    }

    /// Create a service with an explicit concatenation backend
    ///
    /// Validates the configuration, creates the output (and work) directories,
    /// sweeps leftovers from a previous run, and starts the periodic sweep.
    pub async fn with_handler(config: Config, concat: Arc<dyn ConcatHandler>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.storage.output_dir)
            .await
            .map_err(|e| Error::Config {
                message: format!(
                    "cannot create output directory {}: {}",
                    config.storage.output_dir.display(),
                    e
                ),
                key: Some("OUTPUT_DIR".to_string()),
            })?;
        if let Some(work_dir) = &config.storage.work_dir {
            tokio::fs::create_dir_all(work_dir)
                .await
                .map_err(|e| Error::Config {
                    message: format!("cannot create work directory {}: {}", work_dir.display(), e),
                    key: Some("WORK_DIR".to_string()),
                })?;
        }

        let fetcher = Fetcher::new(&config.download)?;

        let removed =
            sweep_expired(&config.storage.output_dir, config.retention.sweep_max_age).await;
        if removed > 0 {
            info!(removed, "removed outputs left over from a previous run");
        }

        let shutdown = CancellationToken::new();
        spawn_periodic_sweep(
            config.storage.output_dir.clone(),
            config.retention.sweep_interval,
            config.retention.sweep_max_age,
            shutdown.clone(),
        );

        info!(
            output_dir = %config.storage.output_dir.display(),
            files_prefix = %config.files_prefix(),
            concat = concat.name(),
            "merge service ready"
        );

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            concat,
            expiry: ExpiryScheduler::new(),
            shutdown,
        })
    }

    /// Name of the concatenation backend in use
    pub fn concat_backend(&self) -> &'static str {
        self.concat.name()
    }

    /// Whether merges can currently succeed as far as tooling is concerned
    pub fn merge_available(&self) -> bool {
        self.concat.is_available()
    }

    /// Pending per-file deletions
    pub fn expiry(&self) -> &ExpiryScheduler {
        &self.expiry
    }

    /// Run one merge
    ///
    /// `request_base` is the `scheme://host` the request arrived on; it is only
    /// used when no public base URL is configured.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for malformed URLs (no I/O is performed) or when
    ///   no public base URL can be determined
    /// - [`Error::Download`] when either source cannot be fetched
    /// - [`Error::ToolExecution`] / [`Error::ExternalTool`] when concatenation fails
    /// - [`Error::Io`] for local filesystem failures
    pub async fn merge(
        &self,
        request: &MergeRequest,
        request_base: Option<&str>,
    ) -> Result<MergeResponse> {
        let validated = request.validate()?;
        let base = self.public_base(request_base)?;

        let started = Instant::now();
        let swept = sweep_expired(
            &self.config.storage.output_dir,
            self.config.retention.sweep_max_age,
        )
        .await;
        if swept > 0 {
            debug!(swept, "removed expired outputs before merge");
        }

        let name = format!("{}.{}", Uuid::new_v4().simple(), OUTPUT_EXTENSION);
        info!(
            output = %name,
            url1 = %validated.url1,
            url2 = %validated.url2,
            "starting merge"
        );

        let work = self.create_work_area()?;
        let inputs: Vec<PathBuf> = INPUT_FILE_NAMES
            .iter()
            .map(|file| work.path().join(file))
            .collect();

        for (index, (url, dest)) in validated.sources().into_iter().zip(&inputs).enumerate() {
            let input = index as u8 + 1;
            let bytes = self
                .fetcher
                .download_to(url, dest)
                .await
                .map_err(|source| {
                    warn!(input, url = %url, error = %source, "source download failed");
                    Error::Download { input, source }
                })?;
            debug!(input, bytes, "source downloaded");
        }

        let staged = work.path().join(STAGED_OUTPUT_NAME);
        self.concat.concat(&inputs, work.path(), &staged).await?;

        let output = self.publish(&staged, name).await?;
        drop(work);

        self.expiry
            .schedule(output.path.clone(), output.expires_in)
            .await;

        let url = join_public_url(&base, &output.served_path);
        info!(
            output = %output.name,
            size_bytes = output.size_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            expires_in_secs = output.expires_in.as_secs(),
            "merge complete"
        );

        Ok(MergeResponse::new(url, &output))
    }

    /// Cancel background work: the periodic sweep and pending deletion timers
    ///
    /// Files whose timers are cancelled remain on disk until the next sweep.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.expiry.shutdown().await;
    }

    fn public_base(&self, request_base: Option<&str>) -> Result<String> {
        match (&self.config.storage.public_base_url, request_base) {
            (Some(configured), _) => Ok(configured.clone()),
            (None, Some(derived)) => Ok(derived.to_string()),
            (None, None) => Err(Error::Validation(
                "cannot build a public URL: request has no Host header and PUBLIC_BASE_URL is unset"
                    .to_string(),
            )),
        }
    }

    fn create_work_area(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("vidmerge-");
        let dir = match &self.config.storage.work_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    async fn publish(&self, staged: &Path, name: String) -> Result<OutputFile> {
        let dest = self.config.storage.output_dir.join(&name);
        publish_file(staged, &dest).await?;

        let size_bytes = tokio::fs::metadata(&dest).await?.len();
        Ok(OutputFile {
            served_path: format!("{}/{}", self.config.files_prefix(), name),
            name,
            path: dest,
            size_bytes,
            expires_in: self.config.retention.expiry_delay,
        })
    }
}

impl Drop for MergeService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Pick the ffmpeg binary from config, then PATH, else the unavailable stand-in
fn resolve_concat_handler(config: &Config) -> Arc<dyn ConcatHandler> {
    let limit = config.tools.output_limit;

    if let Some(path) = &config.tools.ffmpeg_path {
        return Arc::new(FfmpegConcatHandler::new(path.clone(), limit));
    }
    if config.tools.search_path {
        if let Some(handler) = FfmpegConcatHandler::from_path(limit) {
            return Arc::new(handler);
        }
    }

    warn!("ffmpeg not found; merge requests will fail until it is installed");
    Arc::new(UnavailableConcatHandler)
}
