//! Trait for media concatenation backends

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Joins an ordered list of media files into a single output file
///
/// Implementations must not re-encode: the output is the inputs' streams
/// appended in order. On failure no file may be left at `output` that callers
/// could mistake for a finished result; callers write `output` inside a scoped
/// working area and only publish it after success.
///
/// # Examples
///
/// ```no_run
/// use vidmerge::media::{ConcatHandler, FfmpegConcatHandler};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handler = FfmpegConcatHandler::from_path(2000)
///     .expect("ffmpeg binary not found");
///
/// let inputs = [PathBuf::from("1.mp4"), PathBuf::from("2.mp4")];
/// handler.concat(&inputs, Path::new("."), Path::new("out.mp4")).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ConcatHandler: Send + Sync {
    /// Concatenate `inputs` into `output`
    ///
    /// # Arguments
    ///
    /// * `inputs` - Files to join, in playback order
    /// * `work_dir` - Scratch directory for auxiliary files (e.g. the manifest)
    /// * `output` - Destination file, overwritten if present
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolExecution`](crate::Error::ToolExecution) when the
    /// backend rejects the inputs, or
    /// [`Error::ExternalTool`](crate::Error::ExternalTool) when it cannot run.
    async fn concat(&self, inputs: &[PathBuf], work_dir: &Path, output: &Path)
    -> crate::Result<()>;

    /// Whether this backend can actually perform merges
    fn is_available(&self) -> bool {
        true
    }

    /// Get the name of this implementation
    fn name(&self) -> &'static str;
}
