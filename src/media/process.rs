//! External process execution with output capture

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Run `program` with `args`, succeeding only on exit code 0
///
/// stdin is closed; stdout and stderr are captured. On a nonzero exit the
/// combined output (stdout followed by stderr) is truncated to `output_limit`
/// characters and returned in [`Error::ToolExecution`]. A program that cannot
/// be started yields [`Error::ExternalTool`]. Nothing is retried.
pub async fn run_tool<I, S>(program: &Path, args: I, output_limit: usize) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            Error::ExternalTool(format!("Failed to execute {}: {}", program.display(), e))
        })?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    let exit_code = output.status.code();
    tracing::warn!(
        program = %program.display(),
        ?exit_code,
        "external tool failed"
    );

    Err(Error::ToolExecution {
        exit_code,
        output: truncate_output(combined.trim(), output_limit),
    })
}

/// Keep at most `limit` characters of `output`, cutting on a char boundary
pub fn truncate_output(output: &str, limit: usize) -> String {
    match output.char_indices().nth(limit) {
        Some((idx, _)) => output[..idx].to_string(),
        None => output.to_string(),
    }
}
