// CoursePulse - platform/fs.rs
//
// Filesystem helpers for source tables: whole-file reads and content
// fingerprints used as snapshot cache keys.

use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Read the full content of a file as bytes.
pub fn read_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Source file read");
    Ok(bytes)
}

/// Hex-encoded SHA-256 of `bytes`.
///
/// Two reads of a file yield the same fingerprint iff their contents are
/// identical, regardless of modification time.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_content_addressed() {
        assert_eq!(fingerprint(b"titre\n"), fingerprint(b"titre\n"));
        assert_ne!(fingerprint(b"titre\n"), fingerprint(b"titre\r\n"));
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_read_bytes_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_bytes(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
