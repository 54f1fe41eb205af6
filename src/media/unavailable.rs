//! Stand-in handler used when no ffmpeg binary is available

use super::traits::ConcatHandler;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Concat handler that always fails with `Error::ExternalTool`
///
/// Installed when ffmpeg is neither configured nor found in PATH, so the
/// service still starts (health checks, file serving) and merge requests get a
/// clear 503 instead of a spawn failure.
///
/// # Examples
///
/// ```
/// use vidmerge::media::{ConcatHandler, UnavailableConcatHandler};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() {
/// let handler = UnavailableConcatHandler;
/// let result = handler
///     .concat(&[PathBuf::from("1.mp4")], Path::new("."), Path::new("out.mp4"))
///     .await;
/// assert!(result.is_err());
/// assert!(!handler.is_available());
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableConcatHandler;

#[async_trait]
impl ConcatHandler for UnavailableConcatHandler {
    async fn concat(
        &self,
        _inputs: &[PathBuf],
        _work_dir: &Path,
        _output: &Path,
    ) -> crate::Result<()> {
        Err(crate::Error::ExternalTool(
            "merging requires the ffmpeg binary. \
             Set FFMPEG_PATH or ensure ffmpeg is in PATH."
                .into(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concat_returns_external_tool_error() {
        let result = UnavailableConcatHandler
            .concat(&[], Path::new("."), Path::new("out.mp4"))
            .await;
        assert!(matches!(result, Err(crate::Error::ExternalTool(_))));
    }

    #[test]
    fn reports_unavailable() {
        assert!(!UnavailableConcatHandler.is_available());
        assert_eq!(UnavailableConcatHandler.name(), "unavailable");
    }
}
