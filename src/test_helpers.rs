//! Shared test helpers: temp-dir configs and in-process concat backends.

use crate::config::Config;
use crate::media::ConcatHandler;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Config rooted in `temp`, with no background sweep and no PATH lookup
pub(crate) fn test_config(temp: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.output_dir = temp.path().join("output");
    config.storage.work_dir = Some(temp.path().join("work"));
    config.retention.sweep_interval = Duration::ZERO;
    config.tools.search_path = false;
    config.download.connect_timeout = Duration::from_secs(2);
    config.download.read_timeout = Duration::from_secs(5);
    config
}

/// Joins inputs by appending their bytes; stands in for ffmpeg's stream copy
pub(crate) struct ByteConcatHandler;

#[async_trait]
impl ConcatHandler for ByteConcatHandler {
    async fn concat(&self, inputs: &[PathBuf], _work_dir: &Path, output: &Path) -> Result<()> {
        let mut joined = Vec::new();
        for input in inputs {
            joined.extend(tokio::fs::read(input).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bytes"
    }
}

/// Always fails the way ffmpeg does on incompatible inputs
pub(crate) struct FailingConcatHandler;

#[async_trait]
impl ConcatHandler for FailingConcatHandler {
    async fn concat(&self, _inputs: &[PathBuf], _work_dir: &Path, output: &Path) -> Result<()> {
        // ffmpeg may leave a partial file behind before failing
        tokio::fs::write(output, b"partial").await?;
        Err(Error::ToolExecution {
            exit_code: Some(1),
            output: "list.txt: Invalid data found when processing input".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
