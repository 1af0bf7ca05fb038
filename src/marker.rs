//! On-disk completion marker protocol
//!
//! Represents "this destination directory is fully and correctly populated"
//! using only the filesystem, so the fact survives process restarts. The marker
//! is a single empty file with a reserved name created directly under the
//! destination directory, written only after every archive entry has been
//! materialized. Its presence is the sole durable truth that extraction
//! succeeded; a half-populated directory without it is "incomplete" and gets
//! overwritten by the next extraction attempt.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reserved filename of the completion marker.
///
/// Part of the on-disk storage format: changing this constant invalidates every
/// previously-written marker and must be treated as a breaking change.
///
/// The dot-prefixed, crate-namespaced name is chosen so it cannot collide with
/// a legitimate content entry of a well-behaved archive. This is a trust
/// boundary, not a guarantee — an adversarial archive carrying an entry by this
/// exact name would be taken as proof of completion.
pub const COMPLETION_MARKER: &str = ".unpack-once.complete";

/// Path of the completion marker for a destination directory
pub fn marker_path(destination: &Path) -> PathBuf {
    destination.join(COMPLETION_MARKER)
}

/// Check whether a destination directory holds a completed extraction
///
/// A single filesystem stat; called on every request's fast path. Stat errors
/// (permission denied, unreadable parent) are treated as "not complete" — the
/// subsequent extraction attempt will surface the real failure.
pub async fn is_complete(destination: &Path) -> bool {
    tokio::fs::try_exists(marker_path(destination))
        .await
        .unwrap_or(false)
}

/// Record that a destination directory holds a completed extraction
///
/// Creates the marker file with an exclusive-create primitive. "Already exists"
/// is success (another attempt finished first — the durable fact is the same).
/// Any other failure (disk full, permission denied) propagates as
/// [`Error::Marker`]: a silently-missing marker after a real extraction would
/// be a durability bug.
pub async fn mark_complete(destination: &Path) -> Result<()> {
    let path = marker_path(destination);

    match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(_) => {
            debug!(?destination, "completion marker written");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(?destination, "completion marker already present");
            Ok(())
        }
        Err(e) => Err(Error::Marker {
            destination: destination.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
