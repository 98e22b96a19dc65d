// qdebug - platform/config.rs
//
// Logger configuration. Nothing is read from disk or the environment: a
// `LoggerConfig` is built in code, and `Default` resolves the platform temp
// directory for the log path.

use crate::platform::fs;
use crate::util::constants::{DEFAULT_MACRO_NAME, INACTIVITY_WINDOW, MAX_LINE_WIDTH};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one `Logger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// File every call is appended to.
    pub log_path: PathBuf,

    /// Wrap width in display columns.
    pub max_line_width: usize,

    /// Idle time that ends a session.
    pub inactivity_window: Duration,

    /// Macro name searched for in source files when recovering argument
    /// text. Only change this when re-exporting `q!` under another name.
    pub macro_name: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_path: fs::default_log_path(),
            max_line_width: MAX_LINE_WIDTH,
            inactivity_window: INACTIVITY_WINDOW,
            macro_name: DEFAULT_MACRO_NAME.to_string(),
        }
    }
}

impl LoggerConfig {
    /// Default settings writing to `log_path`.
    pub fn with_log_path(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }
}
