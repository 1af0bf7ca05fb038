//! Shared helpers for coordinator integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use unpack_once::{ArchiveReader, ReaderError};

/// Create a stub archive file; the bytes are irrelevant for scripted readers
pub fn create_stub_archive(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"stub archive bytes").unwrap();
    path
}

/// Create a valid tar.gz archive containing the given (name, content) entries
pub fn create_targz_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Scripted reader: counts invocations, optionally sleeps, then either writes
/// a payload file into the destination and succeeds, or fails.
pub struct ScriptedReader {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl ScriptedReader {
    /// Succeeds immediately
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, false)
    }

    /// Succeeds after sleeping for `delay`
    pub fn slow(delay: Duration) -> Self {
        Self::new(delay, false)
    }

    /// Fails after sleeping for `delay`
    pub fn failing(delay: Duration) -> Self {
        Self::new(delay, true)
    }

    fn new(delay: Duration, fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
            fail,
        }
    }

    /// Number of times `extract` was invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArchiveReader for ScriptedReader {
    async fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> std::result::Result<(), ReaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail {
            return Err(ReaderError::Malformed {
                archive: archive.to_path_buf(),
                reason: "scripted failure".to_string(),
            });
        }

        std::fs::write(destination.join("payload.txt"), b"payload").map_err(|e| {
            ReaderError::Io {
                archive: archive.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        Ok(())
    }
}

/// Counting wrapper around a real reader
pub struct CountingReader<R> {
    inner: R,
    calls: AtomicUsize,
}

impl<R> CountingReader<R> {
    /// Wrap `inner`, counting every `extract` invocation
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `extract` was invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: ArchiveReader> ArchiveReader for CountingReader<R> {
    async fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> std::result::Result<(), ReaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(archive, destination).await
    }
}
