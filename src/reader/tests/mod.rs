use crate::error::ReaderError;
use crate::reader::*;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a valid tar.gz archive containing the given (name, content) entries
fn create_targz_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
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

/// Create a valid ZIP archive containing the given (name, content) entries
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[test]
fn test_detect_archive_type_targz() {
    assert_eq!(
        detect_archive_type(Path::new("release.tar.gz")),
        Some(ArchiveType::TarGz)
    );
    assert_eq!(
        detect_archive_type(Path::new("release.tgz")),
        Some(ArchiveType::TarGz)
    );
}

#[test]
fn test_detect_archive_type_zip() {
    assert_eq!(
        detect_archive_type(Path::new("bundle.zip")),
        Some(ArchiveType::Zip)
    );
}

#[test]
fn test_detect_archive_type_is_case_insensitive() {
    assert_eq!(
        detect_archive_type(Path::new("RELEASE.TAR.GZ")),
        Some(ArchiveType::TarGz)
    );
    assert_eq!(
        detect_archive_type(Path::new("Bundle.ZIP")),
        Some(ArchiveType::Zip)
    );
}

#[test]
fn test_detect_archive_type_unknown() {
    assert_eq!(detect_archive_type(Path::new("notes.txt")), None);
    assert_eq!(detect_archive_type(Path::new("archive.tar")), None);
    assert_eq!(detect_archive_type(Path::new("archive.rar")), None);
}

// ---------------------------------------------------------------------------
// tar.gz
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_targz_extracts_files_and_directories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("archive.tar.gz");
    let dest = temp_dir.path().join("out");

    create_targz_archive(
        &archive,
        &[("a.txt", b"hello"), ("sub/b.txt", b"nested content")],
    );

    TarGzReader.extract(&archive, &dest).await.unwrap();

    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"hello");
    assert_eq!(
        std::fs::read(dest.join("sub/b.txt")).unwrap(),
        b"nested content"
    );
}

#[tokio::test]
async fn test_targz_creates_missing_destination() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("archive.tar.gz");
    let dest = temp_dir.path().join("deep/nested/out");

    create_targz_archive(&archive, &[("a.txt", b"hello")]);

    TarGzReader.extract(&archive, &dest).await.unwrap();
    assert!(dest.join("a.txt").is_file());
}

#[tokio::test]
async fn test_targz_missing_archive() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("missing.tar.gz");
    let dest = temp_dir.path().join("out");

    let err = TarGzReader.extract(&archive, &dest).await.unwrap_err();
    assert!(matches!(err, ReaderError::Open { .. }));
}

#[tokio::test]
async fn test_targz_corrupt_archive() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("garbage.tar.gz");
    let dest = temp_dir.path().join("out");

    std::fs::write(&archive, b"this is not gzip data at all").unwrap();

    let err = TarGzReader.extract(&archive, &dest).await.unwrap_err();
    assert!(matches!(err, ReaderError::Malformed { .. }));
}

// ---------------------------------------------------------------------------
// ZIP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_zip_extracts_files_and_directories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("bundle.zip");
    let dest = temp_dir.path().join("out");

    create_zip_archive(
        &archive,
        &[("a.txt", b"hello"), ("sub/b.txt", b"nested content")],
    );

    ZipReader.extract(&archive, &dest).await.unwrap();

    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"hello");
    assert_eq!(
        std::fs::read(dest.join("sub/b.txt")).unwrap(),
        b"nested content"
    );
}

#[tokio::test]
async fn test_zip_missing_archive() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("missing.zip");
    let dest = temp_dir.path().join("out");

    let err = ZipReader.extract(&archive, &dest).await.unwrap_err();
    assert!(matches!(err, ReaderError::Open { .. }));
}

#[tokio::test]
async fn test_zip_corrupt_archive() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("garbage.zip");
    let dest = temp_dir.path().join("out");

    std::fs::write(&archive, b"this is not a zip archive").unwrap();

    let err = ZipReader.extract(&archive, &dest).await.unwrap_err();
    assert!(matches!(err, ReaderError::Malformed { .. }));
}

#[tokio::test]
async fn test_zip_skips_entry_escaping_destination() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("escape.zip");
    let dest = temp_dir.path().join("out");

    create_zip_archive(&archive, &[("../escape.txt", b"evil"), ("safe.txt", b"ok")]);

    ZipReader.extract(&archive, &dest).await.unwrap();

    // The traversal entry was skipped, the well-behaved one extracted
    assert!(!temp_dir.path().join("escape.txt").exists());
    assert_eq!(std::fs::read(dest.join("safe.txt")).unwrap(), b"ok");
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reader_for_routes_by_type() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = temp_dir.path().join("bundle.zip");
    let dest = temp_dir.path().join("out");

    create_zip_archive(&archive, &[("a.txt", b"routed")]);

    let archive_type = detect_archive_type(&archive).unwrap();
    let reader = reader_for(archive_type);
    reader.extract(&archive, &dest).await.unwrap();

    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"routed");
}
