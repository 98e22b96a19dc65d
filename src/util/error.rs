// qdebug - util/error.rs
//
// Typed errors for the debug logger. None of these ever reach the caller of
// `q!`: the logger degrades to unnamed output or drops the write, and records
// the cause through `tracing`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors produced while recovering names, writing the log, or tailing it.
#[derive(Debug)]
pub enum QError {
    /// The source file of a call site could not be found or read.
    SourceUnavailable { path: PathBuf, source: io::Error },

    /// Zero or several logging calls start on the given line.
    AmbiguousCallSite {
        path: PathBuf,
        line: u32,
        matches: usize,
    },

    /// The log file could not be opened or written.
    FileWriteFailure {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// The log file could not be read (qtail only).
    LogRead { path: PathBuf, source: io::Error },
}

impl fmt::Display for QError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable { path, source } => {
                write!(f, "Source file '{}' is unavailable: {source}", path.display())
            }
            Self::AmbiguousCallSite {
                path,
                line,
                matches,
            } => write!(
                f,
                "Expected exactly one logging call at '{}:{line}', found {matches}",
                path.display()
            ),
            Self::FileWriteFailure {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
            Self::LogRead { path, source } => {
                write!(f, "Failed to read log '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for QError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnavailable { source, .. } => Some(source),
            Self::FileWriteFailure { source, .. } => Some(source),
            Self::LogRead { source, .. } => Some(source),
            Self::AmbiguousCallSite { .. } => None,
        }
    }
}
