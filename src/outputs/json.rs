//! JSON document persistence.
//!
//! Documents are written with two-space indentation and fully replace the
//! previous file. There is no temp-file-and-rename step: a crash mid-write
//! can leave a truncated file until the next scheduled run overwrites it.

use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `document` and overwrite `path`, creating parent directories.
///
/// # Arguments
///
/// * `document` - A single-source or aggregate document
/// * `path` - Target file; replaced in full if it already exists
///
/// # Returns
///
/// `Ok(())` once the whole document has been written.
///
/// # Errors
///
/// [`Error::Parse`](crate::error::Error::Parse) if serialization fails and
/// [`Error::Io`](crate::error::Error::Io) if a directory or the file cannot
/// be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_document<T: Serialize>(document: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, json.as_bytes()).await?;
    info!(bytes = json.len(), "Wrote JSON document");
    Ok(())
}
