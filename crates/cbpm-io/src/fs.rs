//! File-system helpers for uploads.

use cbpm_core::files::{sanitize_filename, validate_upload};
use cbpm_core::ValidationError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::IoResult;

/// Creates `path` and its parents. `false` if that fails.
pub fn ensure_directory(path: &Path) -> bool {
    match fs::create_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(?path, error = %e, "Could not create directory");
            false
        }
    }
}

/// Size in bytes, 0 if the file cannot be read.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// Validates an existing file as an upload and returns its size.
pub fn check_upload_file(path: &Path, allowed_extensions: &[&str], max_size: u64) -> IoResult<u64> {
    let name = file_name(path)?;
    let size = fs::metadata(path)?.len();
    validate_upload(name, size, allowed_extensions, max_size)?;
    Ok(size)
}

/// Copies an upload into `upload_dir` under its sanitized name.
///
/// The sanitized name must still pass the upload checks. Returns the
/// destination path.
pub fn stage_upload(
    source: &Path,
    upload_dir: &Path,
    allowed_extensions: &[&str],
    max_size: u64,
) -> IoResult<PathBuf> {
    let name = sanitize_filename(file_name(source)?);
    let size = fs::metadata(source)?.len();
    validate_upload(&name, size, allowed_extensions, max_size)?;

    fs::create_dir_all(upload_dir)?;
    let destination = upload_dir.join(&name);
    fs::copy(source, &destination)?;

    info!(?destination, size, "Upload stored");
    Ok(destination)
}

fn file_name(path: &Path) -> IoResult<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ValidationError::invalid("filename", "not a valid UTF-8 file name").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use cbpm_core::files::{DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS};
    use cbpm_core::{CoreError, MAX_FILE_SIZE};
    use tempfile::tempdir;

    #[test]
    fn test_ensure_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("uploads").join("2025").join("03");
        assert!(ensure_directory(&nested));
        assert!(nested.is_dir());
        // Already there
        assert!(ensure_directory(&nested));

        let file = dir.path().join("plain-file");
        fs::write(&file, b"x").unwrap();
        assert!(!ensure_directory(&file.join("child")));
    }

    #[test]
    fn test_file_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("devis.pdf");
        fs::write(&path, vec![0u8; 1234]).unwrap();
        assert_eq!(file_size(&path), 1234);
        assert_eq!(file_size(&dir.path().join("missing.pdf")), 0);
    }

    #[test]
    fn test_check_upload_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();

        assert_eq!(check_upload_file(&path, DOCUMENT_EXTENSIONS, MAX_FILE_SIZE).unwrap(), 8);
        assert!(matches!(
            check_upload_file(&path, IMAGE_EXTENSIONS, MAX_FILE_SIZE),
            Err(IoError::Core(CoreError::Validation(ValidationError::NotAllowed { .. })))
        ));
        assert!(matches!(
            check_upload_file(&path, DOCUMENT_EXTENSIONS, 4),
            Err(IoError::Core(CoreError::Validation(ValidationError::OutOfRange { .. })))
        ));
        assert!(matches!(
            check_upload_file(&dir.path().join("absent.pdf"), DOCUMENT_EXTENSIONS, MAX_FILE_SIZE),
            Err(IoError::Io(_))
        ));
    }

    #[test]
    fn test_stage_upload_sanitizes_name() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo|chantier.jpg");
        fs::write(&source, b"jpeg").unwrap();
        let uploads = dir.path().join("uploads");

        let stored = stage_upload(&source, &uploads, IMAGE_EXTENSIONS, MAX_FILE_SIZE).unwrap();
        assert_eq!(stored, uploads.join("photo_chantier.jpg"));
        assert_eq!(fs::read(&stored).unwrap(), b"jpeg");
    }

    #[test]
    fn test_stage_upload_rejects_wrong_type() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("script.sh");
        fs::write(&source, b"#!/bin/sh").unwrap();
        let uploads = dir.path().join("uploads");

        assert!(stage_upload(&source, &uploads, DOCUMENT_EXTENSIONS, MAX_FILE_SIZE).is_err());
        assert!(!uploads.exists());
    }
}
