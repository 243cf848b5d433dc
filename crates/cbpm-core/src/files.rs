//! # Upload Filenames
//!
//! Name and size checks for files users attach (photos, scanned contracts,
//! CVs). The actual file access lives in `cbpm-io`.

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Image types accepted for uploads.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Document types accepted for uploads.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// Longest filename most file systems accept.
pub const MAX_FILENAME_LENGTH: usize = 255;

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Whether `filename` can be used as-is.
///
/// ASCII letters, digits, `.`, `_`, `-` and whitespace only. No leading dot
/// and no `..` anywhere.
///
/// ## Example
/// ```rust
/// use cbpm_core::files::is_safe_filename;
///
/// assert!(is_safe_filename("facture 2025-03.pdf"));
/// assert!(!is_safe_filename("../etc/passwd"));
/// assert!(!is_safe_filename(".env"));
/// ```
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains("..")
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') || c.is_whitespace())
}

/// Replaces reserved characters with `_` and caps the length, keeping the
/// extension.
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if sanitized.chars().count() <= MAX_FILENAME_LENGTH {
        return sanitized;
    }

    let (stem, extension) = split_extension(&sanitized);
    let keep = MAX_FILENAME_LENGTH.saturating_sub(extension.chars().count());
    let mut truncated: String = stem.chars().take(keep).collect();
    truncated.push_str(extension);
    truncated
}

/// Case-insensitive extension check. A name without an extension never
/// matches.
pub fn is_valid_file_type(filename: &str, allowed_extensions: &[&str]) -> bool {
    extension_of(filename).is_some_and(|ext| {
        allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    })
}

/// Checks name, type and size of an upload.
pub fn validate_upload(
    filename: &str,
    size: u64,
    allowed_extensions: &[&str],
    max_size: u64,
) -> ValidationResult<()> {
    if filename.trim().is_empty() {
        return Err(ValidationError::required("filename"));
    }

    if !is_safe_filename(filename) {
        return Err(ValidationError::invalid(
            "filename",
            "only letters, digits, '.', '_', '-' and spaces are allowed",
        ));
    }

    if !is_valid_file_type(filename, allowed_extensions) {
        return Err(ValidationError::NotAllowed {
            field: "file type".to_string(),
            allowed: allowed_extensions.iter().map(|e| e.to_string()).collect(),
        });
    }

    if size > max_size {
        return Err(ValidationError::OutOfRange {
            field: "file size".to_string(),
            min: 0,
            max: i64::try_from(max_size).unwrap_or(i64::MAX),
        });
    }

    Ok(())
}

fn extension_of(filename: &str) -> Option<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Splits "name.ext" into ("name", ".ext"). A leading dot is not an
/// extension separator.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
