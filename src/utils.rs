//! Filesystem and URL helpers for publishing merged files

use axum::http::HeaderMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Move `source` to `dest` so that `dest` only ever appears complete
///
/// A plain rename is used when both paths share a filesystem. Across
/// filesystems the file is copied to a hidden `.<name>.part` sibling of `dest`
/// and then renamed into place; the source is removed afterwards.
pub async fn publish_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(source, dest).await {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(e),
        Err(e) => {
            tracing::debug!(
                source = ?source,
                dest = ?dest,
                error = %e,
                "rename failed, falling back to copy"
            );
        }
    }

    let staging = staging_path(dest);
    if let Err(e) = tokio::fs::copy(source, &staging).await {
        tokio::fs::remove_file(&staging).await.ok();
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&staging, dest).await {
        tokio::fs::remove_file(&staging).await.ok();
        return Err(e);
    }
    tokio::fs::remove_file(source).await.ok();
    Ok(())
}

/// Hidden sibling used while copying into the output directory
pub(crate) fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.part"))
}

/// Join a base URL (scheme and authority, optional path) with a served path
pub fn join_public_url(base: &str, served_path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        served_path.trim_start_matches('/')
    )
}

/// Derive `scheme://host` from an inbound request's headers
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy sets it, otherwise
/// `http`. The authority comes from `X-Forwarded-Host`, then `Host`. Returns
/// `None` when no host is known.
pub fn request_base_url(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let scheme = match header("x-forwarded-proto") {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    let host = header("x-forwarded-host").or_else(|| header("host"))?;

    Some(format!("{scheme}://{host}"))
}
