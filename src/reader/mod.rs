//! Archive readers
//!
//! The coordinator is format-agnostic: it consumes anything implementing
//! [`ArchiveReader`] and never looks inside the container itself. Two concrete
//! readers are provided, tar+gzip and ZIP. Both run their blocking container
//! walk on the blocking thread pool so extraction never stalls the async
//! runtime.

mod targz;
mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

// Re-exports
pub use targz::TarGzReader;
pub use zip::ZipReader;

use crate::error::ReaderError;
use async_trait::async_trait;
use std::path::Path;

/// Supported archive container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    /// Gzip-compressed tarball (`.tar.gz` / `.tgz`)
    TarGz,
    /// ZIP archive (`.zip`)
    Zip,
}

/// Capability consumed by the coordinator: materialize an archive's entries
/// into a destination directory
///
/// Implementations must be deterministic for a given (source, destination)
/// pair: either every entry is written or an error is returned. They must
/// tolerate a destination that already contains files from an earlier partial
/// attempt (overwrite, not merge).
#[async_trait]
pub trait ArchiveReader: Send + Sync {
    /// Walk the archive at `archive` and write its entries under `destination`
    async fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> std::result::Result<(), ReaderError>;
}

/// Detect the archive container format by file extension
///
/// Returns `None` for anything that is not a recognized archive name.
pub fn detect_archive_type(path: &Path) -> Option<ArchiveType> {
    let name = path.file_name()?.to_str()?.to_lowercase();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(ArchiveType::TarGz)
    } else if name.ends_with(".zip") {
        Some(ArchiveType::Zip)
    } else {
        None
    }
}

/// Route an archive type to its reader
pub fn reader_for(archive_type: ArchiveType) -> Box<dyn ArchiveReader> {
    match archive_type {
        ArchiveType::TarGz => Box::new(TarGzReader),
        ArchiveType::Zip => Box::new(ZipReader),
    }
}
