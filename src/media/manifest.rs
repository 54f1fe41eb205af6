//! Concat demuxer manifest

use std::path::{Path, PathBuf};

/// File name of the manifest inside a working area
pub(crate) const MANIFEST_FILE_NAME: &str = "list.txt";

/// Ordered input listing for ffmpeg's concat demuxer
///
/// Rendered as one `file '<path>'` line per input. Paths are made absolute
/// against the current directory so the demuxer does not resolve them relative
/// to the manifest's own location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    /// Build a manifest from inputs in playback order
    pub fn new(inputs: &[PathBuf]) -> std::io::Result<Self> {
        let entries = inputs
            .iter()
            .map(std::path::absolute)
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Paths listed in the manifest
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Manifest text
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file '{}'\n", escape_path(p)))
            .collect()
    }

    /// Write the manifest into `dir`, returning its path
    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE_NAME);
        tokio::fs::write(&path, self.render()).await?;
        Ok(path)
    }
}

// The demuxer reads single-quoted strings; a literal quote closes the string,
// is backslash-escaped, and reopens it.
fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}
