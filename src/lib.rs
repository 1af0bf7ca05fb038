//! # unpack-once
//!
//! Single-flight, durably idempotent archive extraction coordinator.
//!
//! ## Design Philosophy
//!
//! unpack-once is designed to be:
//! - **Exactly-once per destination** - Concurrent callers for the same
//!   destination coalesce into one physical extraction
//! - **Durable across restarts** - Completion is recorded on disk, not only in
//!   memory, so a new process never re-extracts a finished destination
//! - **Bounded** - Every caller carries its own wait budget and receives a
//!   typed outcome, never a silent hang
//! - **Library-first** - No CLI or daemon, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use unpack_once::{CoordinatorConfig, ExtractionCoordinator, TarGzReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = ExtractionCoordinator::new(CoordinatorConfig::default());
//!
//!     // First call extracts; every later call for the same destination
//!     // (even from a fresh process) is a single stat of the completion marker.
//!     coordinator
//!         .extract(
//!             Path::new("release.tar.gz"),
//!             Path::new("/var/cache/unpacked/release"),
//!             &TarGzReader,
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Extraction coordinator (the public entry point)
pub mod coordinator;
/// Error types
pub mod error;
/// On-disk completion marker protocol
pub mod marker;
/// Archive readers (tar+gzip and ZIP)
pub mod reader;
/// In-flight extraction registry
pub mod registry;

// Re-export commonly used types
pub use config::CoordinatorConfig;
pub use coordinator::ExtractionCoordinator;
pub use error::{Error, ReaderError, Result};
pub use marker::{COMPLETION_MARKER, is_complete, marker_path};
pub use reader::{
    ArchiveReader, ArchiveType, TarGzReader, ZipReader, detect_archive_type, reader_for,
};
pub use registry::{Acquire, CompletionSignal, ExtractionPermit, ExtractionRegistry};
