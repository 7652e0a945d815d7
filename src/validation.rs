//! Input validation for the text and file stores
//! Rejects blank pastes, oversized payloads, and filenames that could escape
//! the storage directory

use anyhow::{anyhow, Result};

use crate::constants::{MAX_FILE_NAME_BYTES, MAX_TEXT_BYTES};

/// Validate text content for the history store
pub fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(anyhow!("text cannot be empty"));
    }

    if text.len() > MAX_TEXT_BYTES {
        return Err(anyhow!(
            "text too long: {} bytes (max: {})",
            text.len(),
            MAX_TEXT_BYTES
        ));
    }

    Ok(())
}

/// Validate a filename after sanitization
///
/// The storage name doubles as a filesystem path component and a RocksDB key
/// suffix, so anything that could traverse directories is rejected outright.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!("filename cannot be empty"));
    }

    if name.len() > MAX_FILE_NAME_BYTES {
        return Err(anyhow!(
            "filename too long: {} bytes (max: {})",
            name.len(),
            MAX_FILE_NAME_BYTES
        ));
    }

    if name == "." || name == ".." || name.contains("..") {
        return Err(anyhow!("filename contains path traversal"));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(anyhow!("filename contains path separators"));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(anyhow!("filename contains control characters"));
    }

    Ok(())
}

/// Derive the storage name from a client-supplied filename
///
/// Browsers send bare names but nothing stops a caller from sending a full
/// path; only the final component is kept. Returns an error when nothing
/// usable remains.
pub fn sanitize_file_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    let name = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();

    validate_file_name(&name)?;

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_text() {
        assert!(validate_text("hello world").is_ok());
        assert!(validate_text("  padded but not blank  ").is_ok());
        assert!(validate_text("日本語のテキスト").is_ok());
    }

    #[test]
    fn test_invalid_text() {
        assert!(validate_text("").is_err()); // empty
        assert!(validate_text("   \t\n  ").is_err()); // whitespace only
        assert!(validate_text(&"x".repeat(MAX_TEXT_BYTES + 1)).is_err()); // too long
    }

    #[test]
    fn test_valid_file_name() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("photo 2024.jpg").is_ok());
        assert!(validate_file_name("no_extension").is_ok());
    }

    #[test]
    fn test_invalid_file_name() {
        assert!(validate_file_name("").is_err()); // empty
        assert!(validate_file_name("..").is_err()); // traversal
        assert!(validate_file_name("../etc/passwd").is_err()); // traversal
        assert!(validate_file_name("dir/file.txt").is_err()); // separator
        assert!(validate_file_name("dir\\file.txt").is_err()); // separator
        assert!(validate_file_name("file\x00name").is_err()); // control char
        assert!(validate_file_name(&"a".repeat(300)).is_err()); // too long
    }

    #[test]
    fn test_sanitize_keeps_bare_names() {
        assert_eq!(sanitize_file_name("notes.txt").unwrap(), "notes.txt");
        assert_eq!(
            sanitize_file_name("  spaced.bin  ").unwrap(),
            "spaced.bin"
        );
    }

    #[test]
    fn test_sanitize_strips_paths() {
        assert_eq!(
            sanitize_file_name("/home/user/notes.txt").unwrap(),
            "notes.txt"
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\user\\notes.txt").unwrap(),
            "notes.txt"
        );
    }

    #[test]
    fn test_sanitize_rejects_unusable() {
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("   ").is_err());
        assert!(sanitize_file_name("dir/").is_err()); // nothing after separator
        assert!(sanitize_file_name("..").is_err());
    }
}
