// qdebug - platform/fs.rs
//
// Filesystem access: reading source files and appending to the log.
// The log file is opened per write; no handle is kept between calls.

use crate::util::constants::{LOG_FILE_MODE, LOG_FILE_NAME};
use crate::util::error::QError;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default log location: `<temp dir>/q`.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Append `bytes` to the log at `path`, creating it (mode 0600 on Unix) if
/// needed.
pub fn append_log(path: &Path, bytes: &[u8]) -> Result<(), QError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOG_FILE_MODE);
    }
    #[cfg(not(unix))]
    let _ = LOG_FILE_MODE;

    let mut file = options.open(path).map_err(|source| QError::FileWriteFailure {
        path: path.to_path_buf(),
        operation: "open",
        source,
    })?;
    file.write_all(bytes)
        .map_err(|source| QError::FileWriteFailure {
            path: path.to_path_buf(),
            operation: "write",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q");
        append_log(&path, b"one\n").unwrap();
        append_log(&path, b"two\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_log_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q");
        append_log(&path, b"x").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_append_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("q");
        assert!(matches!(
            append_log(&path, b"x"),
            Err(QError::FileWriteFailure {
                operation: "open",
                ..
            })
        ));
    }

    #[test]
    fn test_read_file_lossy_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src.rs");
        std::fs::write(&path, b"q!(a);\xff\n").unwrap();
        let text = read_file_lossy(&path).unwrap();
        assert!(text.starts_with("q!(a);"));
        assert!(text.contains('\u{FFFD}'));
    }
}
