use crate::error::ReaderError;
use async_trait::async_trait;
use std::path::Path;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use super::ArchiveReader;

/// Archive reader for ZIP files
pub struct ZipReader;

#[async_trait]
impl ArchiveReader for ZipReader {
    async fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> std::result::Result<(), ReaderError> {
        let archive_owned = archive.to_path_buf();
        let destination_owned = destination.to_path_buf();

        // Use spawn_blocking to avoid blocking the async runtime during extraction
        spawn_blocking(move || unpack_zip(&archive_owned, &destination_owned))
            .await
            .map_err(|e| ReaderError::Io {
                archive: archive.to_path_buf(),
                reason: format!("extraction task panicked: {}", e),
            })?
    }
}

fn unpack_zip(archive_path: &Path, dest_path: &Path) -> Result<(), ReaderError> {
    debug!(?archive_path, ?dest_path, "attempting ZIP extraction");

    // Create destination directory if it doesn't exist
    std::fs::create_dir_all(dest_path).map_err(|e| ReaderError::Io {
        archive: archive_path.to_path_buf(),
        reason: format!("failed to create destination: {}", e),
    })?;

    // Open the archive
    let file = std::fs::File::open(archive_path).map_err(|e| ReaderError::Open {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| ReaderError::Malformed {
        archive: archive_path.to_path_buf(),
        reason: format!("failed to read ZIP archive: {}", e),
    })?;

    let mut entry_count = 0usize;

    // Extract each entry
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ReaderError::Malformed {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read ZIP entry: {}", e),
        })?;

        // Entries addressed outside the destination are skipped, not written
        let file_path = match entry.enclosed_name().map(Path::to_path_buf) {
            Some(relative) => dest_path.join(relative),
            None => {
                warn!(?archive_path, "skipping entry with unsafe path");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&file_path).map_err(|e| ReaderError::Io {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to create directory: {}", e),
            })?;
        } else {
            // Create parent directories if needed
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ReaderError::Io {
                    archive: archive_path.to_path_buf(),
                    reason: format!("failed to create parent directories: {}", e),
                })?;
            }

            let mut outfile = std::fs::File::create(&file_path).map_err(|e| ReaderError::Io {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to create output file: {}", e),
            })?;

            std::io::copy(&mut entry, &mut outfile).map_err(|e| ReaderError::Io {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to extract file: {}", e),
            })?;

            entry_count += 1;
        }
    }

    info!(?archive_path, entry_count, "ZIP extraction successful");

    Ok(())
}
