//! Extraction coordinator
//!
//! The only entry point. Glues the marker protocol, the in-flight registry,
//! and an archive reader into the externally observable contract: an archive
//! is decompressed into a destination directory exactly once, no matter how
//! many concurrent callers ask for it and no matter how often the process
//! restarts. Concurrent callers for the same destination are coalesced into
//! one physical extraction and all observe that attempt's outcome; callers for
//! different destinations never serialize each other.

use crate::config::CoordinatorConfig;
use crate::error::{Error, Result};
use crate::marker;
use crate::reader::ArchiveReader;
use crate::registry::{Acquire, ExtractionRegistry};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Single-flight, durably idempotent extraction coordinator
///
/// Cheap to share behind an `Arc`; all methods take `&self`. The registry
/// inside is process-local — durability across restarts comes solely from the
/// completion marker on disk.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use unpack_once::{CoordinatorConfig, ExtractionCoordinator, ZipReader};
///
/// # async fn example() -> unpack_once::Result<()> {
/// let coordinator = ExtractionCoordinator::new(CoordinatorConfig::default());
/// coordinator
///     .extract(Path::new("bundle.zip"), Path::new("/tmp/bundle"), &ZipReader)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ExtractionCoordinator {
    registry: ExtractionRegistry,
    max_wait: Duration,
}

impl Default for ExtractionCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl ExtractionCoordinator {
    /// Create a coordinator with the given configuration
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            registry: ExtractionRegistry::new(),
            max_wait: config.max_wait(),
        }
    }

    /// Extract `source` into `destination` exactly once, using the
    /// configured default wait budget
    ///
    /// See [`extract_with_max_wait`](Self::extract_with_max_wait) for the full
    /// contract.
    pub async fn extract(
        &self,
        source: &Path,
        destination: &Path,
        reader: &dyn ArchiveReader,
    ) -> Result<()> {
        self.extract_with_max_wait(source, destination, reader, self.max_wait)
            .await
    }

    /// Extract `source` into `destination` exactly once, waiting up to
    /// `max_wait` if another caller already owns the extraction
    ///
    /// Contract:
    /// - If the destination already carries a completion marker, returns
    ///   success after a single stat — no registry interaction, no writes.
    /// - Otherwise exactly one concurrent caller per destination performs the
    ///   physical extraction; everyone else waits on the same in-flight
    ///   attempt and observes its outcome.
    /// - A waiter whose budget elapses gets [`Error::Timeout`]; the extraction
    ///   itself keeps running under its owner and may still succeed for anyone
    ///   who asks again.
    /// - Failures leave no marker behind, so a later call safely retries by
    ///   overwriting the partial destination.
    pub async fn extract_with_max_wait(
        &self,
        source: &Path,
        destination: &Path,
        reader: &dyn ArchiveReader,
        max_wait: Duration,
    ) -> Result<()> {
        // Invalid input is a local, synchronous error: no registry interaction
        let source_meta =
            tokio::fs::metadata(source)
                .await
                .map_err(|e| Error::InvalidInput {
                    path: source.to_path_buf(),
                    reason: format!("source archive not accessible: {}", e),
                })?;
        if !source_meta.is_file() {
            return Err(Error::InvalidInput {
                path: source.to_path_buf(),
                reason: "source is not a regular file".to_string(),
            });
        }
        let key = destination_key(destination)?;

        // Fast path: prior success recorded on disk
        if marker::is_complete(&key).await {
            debug!(destination = ?key, "destination already complete, skipping extraction");
            return Ok(());
        }

        match self.registry.try_acquire(&key) {
            Acquire::Waiter(signal) => {
                debug!(destination = ?key, "waiting on in-flight extraction");
                signal.wait(max_wait).await
            }
            Acquire::Owner(permit) => {
                // Double-check: a previous generation may have completed and
                // released between the fast path and acquisition
                if marker::is_complete(&key).await {
                    debug!(destination = ?key, "destination completed while acquiring ownership");
                    permit.resolve(Ok(()));
                    return Ok(());
                }

                let outcome = run_extraction(source, &key, reader).await;
                // Unblock every attached waiter, then release the entry
                permit.resolve(outcome.clone());
                outcome
            }
        }
    }
}

/// Perform one physical extraction attempt as the owner of a generation
async fn run_extraction(
    source: &Path,
    destination: &Path,
    reader: &dyn ArchiveReader,
) -> Result<()> {
    if let Ok(true) = tokio::fs::try_exists(destination).await {
        // Recoverable anomaly: a previous attempt died before writing its
        // marker. Stale contents are overwritten, not merged.
        warn!(
            ?destination,
            "destination exists without completion marker, overwriting stale contents"
        );
    }

    tokio::fs::create_dir_all(destination)
        .await
        .map_err(|e| Error::Destination {
            destination: destination.to_path_buf(),
            reason: e.to_string(),
        })?;

    info!(?source, ?destination, "extracting archive");

    reader.extract(source, destination).await?;

    // Success without durable proof of completion is not success
    marker::mark_complete(destination).await?;

    info!(?destination, "extraction complete");

    Ok(())
}

/// Normalize a destination path into its canonical registry key
///
/// The destination may not exist yet, so this resolves relative paths against
/// the current working directory without touching the filesystem; symlinks are
/// not chased.
fn destination_key(destination: &Path) -> Result<PathBuf> {
    if destination.as_os_str().is_empty() {
        return Err(Error::InvalidInput {
            path: destination.to_path_buf(),
            reason: "destination path is empty".to_string(),
        });
    }

    std::path::absolute(destination).map_err(|e| Error::InvalidInput {
        path: destination.to_path_buf(),
        reason: format!("cannot resolve destination path: {}", e),
    })
}
