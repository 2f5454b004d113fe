//! Content path resolution.
//!
//! Catalog entries store model paths relative to a content root that may sit
//! several directories above the working directory (e.g. when the host runs
//! from a build output folder). Resolution walks up from a start directory and
//! returns the first existing `<dir>/<relative>`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Number of parent hops tried above the start directory.
pub const CONTENT_SEARCH_DEPTH: usize = 10;

/// The relative path did not exist under the start directory or any of its
/// ancestors within the search depth.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Content not found: {relative} (searched {start} and {depth} parent directories)")]
pub struct ContentNotFound {
    pub relative: String,
    pub start: String,
    pub depth: usize,
}

/// Resolve `relative` by trying `start/relative`, then `start/../relative`,
/// and so on for at most `max_depth` parent hops.
///
/// A file at ancestor depth `d` (0 = `start` itself) is found when
/// `d <= max_depth`. The returned path is absolute.
pub fn resolve_content_path(
    relative: impl AsRef<Path>,
    start: impl AsRef<Path>,
    max_depth: usize,
) -> Result<PathBuf, ContentNotFound> {
    let relative = relative.as_ref();
    let start = start.as_ref();

    let not_found = || ContentNotFound {
        relative: relative.display().to_string(),
        start: start.display().to_string(),
        depth: max_depth,
    };

    if relative.as_os_str().is_empty() {
        return Err(not_found());
    }

    let base = absolute_start(start);

    for (depth, dir) in base.ancestors().take(max_depth + 1).enumerate() {
        let candidate = dir.join(relative);
        log::trace!("content lookup [{}]: {}", depth, candidate.display());
        if candidate.exists() {
            log::debug!("Resolved {} -> {}", relative.display(), candidate.display());
            return Ok(candidate);
        }
    }

    log::warn!(
        "Content not found within {} parent directories: {}",
        max_depth,
        relative.display()
    );
    Err(not_found())
}

/// Canonical form of `start`, or `start` joined onto the working directory
/// when it cannot be canonicalized (e.g. it does not exist yet).
fn absolute_start(start: &Path) -> PathBuf {
    if let Ok(path) = std::fs::canonicalize(start) {
        return path;
    }
    if start.is_absolute() {
        return start.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(start),
        Err(err) => {
            log::warn!("Cannot read working directory: {}", err);
            start.to_path_buf()
        }
    }
}
