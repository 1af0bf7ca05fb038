use crate::error::ReaderError;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use std::path::Path;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use super::ArchiveReader;

/// Archive reader for gzip-compressed tarballs
pub struct TarGzReader;

#[async_trait]
impl ArchiveReader for TarGzReader {
    async fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> std::result::Result<(), ReaderError> {
        let archive_owned = archive.to_path_buf();
        let destination_owned = destination.to_path_buf();

        // Use spawn_blocking to avoid blocking the async runtime during extraction
        spawn_blocking(move || unpack_tar_gz(&archive_owned, &destination_owned))
            .await
            .map_err(|e| ReaderError::Io {
                archive: archive.to_path_buf(),
                reason: format!("extraction task panicked: {}", e),
            })?
    }
}

fn unpack_tar_gz(archive_path: &Path, dest_path: &Path) -> Result<(), ReaderError> {
    debug!(?archive_path, ?dest_path, "attempting tar.gz extraction");

    // Create destination directory if it doesn't exist
    std::fs::create_dir_all(dest_path).map_err(|e| ReaderError::Io {
        archive: archive_path.to_path_buf(),
        reason: format!("failed to create destination: {}", e),
    })?;

    let file = std::fs::File::open(archive_path).map_err(|e| ReaderError::Open {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut tar = tar::Archive::new(GzDecoder::new(file));

    let entries = tar.entries().map_err(|e| ReaderError::Malformed {
        archive: archive_path.to_path_buf(),
        reason: format!("failed to read tar entries: {}", e),
    })?;

    let mut entry_count = 0usize;
    for entry in entries {
        let mut entry = entry.map_err(|e| ReaderError::Malformed {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read tar entry: {}", e),
        })?;

        // unpack_in rejects entries that would land outside dest_path
        let unpacked = entry.unpack_in(dest_path).map_err(|e| ReaderError::Io {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to extract entry: {}", e),
        })?;

        if unpacked {
            entry_count += 1;
        } else {
            warn!(?archive_path, "skipping entry with unsafe path");
        }
    }

    info!(?archive_path, entry_count, "tar.gz extraction successful");

    Ok(())
}
