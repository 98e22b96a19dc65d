// qdebug - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

use std::time::Duration;

// =============================================================================
// Crate metadata
// =============================================================================

/// Name of the companion tail binary.
pub const APP_NAME: &str = "qtail";

/// Current crate version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log file
// =============================================================================

/// File name of the log, created inside the system temp directory.
pub const LOG_FILE_NAME: &str = "q";

/// Permission bits used when the log file is created (Unix only).
pub const LOG_FILE_MODE: u32 = 0o600;

// =============================================================================
// Layout
// =============================================================================

/// Maximum display width of a physical log line. A single blob wider than
/// this is still written on one line.
pub const MAX_LINE_WIDTH: usize = 80;

/// Widest single-line `{:?}` rendering accepted before falling back to the
/// expanded `{:#?}` form.
pub const COMPACT_RENDER_MAX_WIDTH: usize = 60;

/// Printed in place of a value whose `Debug` impl returned an error.
pub const DEBUG_ERROR_PLACEHOLDER: &str = "<Debug error>";

/// Time format of the session header (UTC wall clock).
pub const HEADER_TIME_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Sessions
// =============================================================================

/// Idle time after which the next call starts a new session.
pub const INACTIVITY_WINDOW: Duration = Duration::from_secs(2);

/// Name of the logging macro searched for when recovering argument text.
pub const DEFAULT_MACRO_NAME: &str = "q";

// =============================================================================
// qtail
// =============================================================================

/// How often `qtail --follow` polls the log file for new bytes (ms).
pub const TAIL_POLL_INTERVAL_MS: u64 = 250;

/// How often the cancel flag is checked within each poll sleep (ms).
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 50;

/// Maximum bytes read from the log in one poll tick.
pub const MAX_TAIL_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Default tracing filter for the `qtail` binary's own diagnostics.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
