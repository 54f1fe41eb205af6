//! Concatenation via the external ffmpeg binary

use super::manifest::ConcatManifest;
use super::process::run_tool;
use super::traits::ConcatHandler;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Stream-copy concatenation using ffmpeg's concat demuxer
///
/// Runs the equivalent of
/// `ffmpeg -y -hide_banner -loglevel error -f concat -safe 0 -i <manifest> -c copy <output>`.
/// Inputs are trusted to share codecs; nothing is re-encoded or validated.
///
/// # Examples
///
/// ```no_run
/// use vidmerge::media::FfmpegConcatHandler;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let handler = FfmpegConcatHandler::new(PathBuf::from("/usr/bin/ffmpeg"), 2000);
///
/// // Or auto-discover from PATH
/// let handler = FfmpegConcatHandler::from_path(2000)
///     .expect("ffmpeg not found in PATH");
/// ```
#[derive(Debug, Clone)]
pub struct FfmpegConcatHandler {
    binary_path: PathBuf,
    output_limit: usize,
}

impl FfmpegConcatHandler {
    /// Create a handler with an explicit binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the ffmpeg binary
    /// * `output_limit` - Maximum characters of tool output kept on failure
    pub fn new(binary_path: PathBuf, output_limit: usize) -> Self {
        Self {
            binary_path,
            output_limit,
        }
    }

    /// Attempt to find ffmpeg in PATH
    ///
    /// Uses the `which` crate to search for the `ffmpeg` binary in the system PATH.
    pub fn from_path(output_limit: usize) -> Option<Self> {
        which::which("ffmpeg")
            .ok()
            .map(|path| Self::new(path, output_limit))
    }

    /// Path of the binary this handler runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Command line arguments for one concatenation
    pub fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(manifest.as_os_str().to_owned());
        args.push("-c".into());
        args.push("copy".into());
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl ConcatHandler for FfmpegConcatHandler {
    async fn concat(
        &self,
        inputs: &[PathBuf],
        work_dir: &Path,
        output: &Path,
    ) -> crate::Result<()> {
        let manifest_path = ConcatManifest::new(inputs)?.write_to(work_dir).await?;

        tracing::debug!(
            binary = %self.binary_path.display(),
            manifest = %manifest_path.display(),
            output = %output.display(),
            inputs = inputs.len(),
            "running ffmpeg concat"
        );

        let result = run_tool(
            &self.binary_path,
            Self::concat_args(&manifest_path, output),
            self.output_limit,
        )
        .await;

        // The manifest is single-use; the working area removes it anyway
        tokio::fs::remove_file(&manifest_path).await.ok();

        result
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
