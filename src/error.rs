//! Error types for unpack-once
//!
//! Every failure the coordinator can produce is a typed variant with enough
//! context (paths, reasons) to diagnose it. All variants are `Clone` because a
//! single in-flight outcome fans out to every waiter attached to the same
//! destination key.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for unpack-once operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unpack-once
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Source archive missing or not a regular file, or destination path unusable.
    ///
    /// Returned synchronously, before any registry interaction.
    #[error("invalid input {path}: {reason}")]
    InvalidInput {
        /// The offending path (source archive or destination)
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// Archive reader failed mid-extraction (corrupt archive, I/O error)
    ///
    /// The destination directory may be left partially populated; no completion
    /// marker is written, so a later call safely retries by overwriting.
    #[error("reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Destination directory could not be created or prepared by the owner
    #[error("failed to prepare destination {destination}: {reason}")]
    Destination {
        /// The destination directory that could not be prepared
        destination: PathBuf,
        /// The underlying filesystem error
        reason: String,
    },

    /// Extraction succeeded but the durable completion marker could not be written
    ///
    /// Treated as a failed extraction: without durable proof of completion the
    /// destination is still "incomplete" and eligible for re-extraction.
    #[error("failed to record completion marker in {destination}: {reason}")]
    Marker {
        /// The destination whose marker could not be written
        destination: PathBuf,
        /// The underlying filesystem error
        reason: String,
    },

    /// A waiter's bound elapsed before the in-flight extraction resolved
    ///
    /// Local to the timed-out caller: the owner keeps extracting in the
    /// background and other waiters keep their own timers.
    #[error("timed out after {waited:?} waiting for in-flight extraction into {destination}")]
    Timeout {
        /// The destination key the caller was waiting on
        destination: PathBuf,
        /// How long the caller waited before giving up
        waited: Duration,
    },

    /// The owning extraction attempt ended without reporting an outcome
    ///
    /// Happens when the owner's task is dropped (panic or cancellation) between
    /// acquiring ownership and resolving the signal. The destination carries no
    /// marker, so calling `extract` again starts a fresh attempt.
    #[error("in-flight extraction into {destination} ended without reporting an outcome")]
    Interrupted {
        /// The destination key whose owning attempt vanished
        destination: PathBuf,
    },
}

/// Archive reader errors
///
/// Produced by [`ArchiveReader`](crate::reader::ArchiveReader) implementations
/// and surfaced to the owner and every attached waiter of the failed attempt.
#[derive(Debug, Clone, Error)]
pub enum ReaderError {
    /// Failed to open the source archive
    #[error("failed to open archive {archive}: {reason}")]
    Open {
        /// The archive file that could not be opened
        archive: PathBuf,
        /// The underlying I/O error
        reason: String,
    },

    /// The archive container is malformed or could not be parsed
    #[error("malformed archive {archive}: {reason}")]
    Malformed {
        /// The archive file that failed to parse
        archive: PathBuf,
        /// The reason parsing failed
        reason: String,
    },

    /// I/O error while materializing entries into the destination
    #[error("I/O error while extracting {archive}: {reason}")]
    Io {
        /// The archive being extracted when the error occurred
        archive: PathBuf,
        /// The underlying I/O error
        reason: String,
    },
}
