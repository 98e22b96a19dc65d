// qdebug - app/logger.rs
//
// The logger behind `q!`: renders values, recovers their names, decides on
// a session header, lays the entry out and appends it to the log file.
//
// Design principles:
// - One mutex guards the session state, the source cache and the output
//   buffer for the whole call, so entries from concurrent threads never
//   interleave and appear in lock order.
// - Nothing is ever returned to the caller. Missing names degrade to bare
//   values; write failures drop the entry. Causes go to `tracing` at debug.
// - The buffer is flushed and cleared at the end of every call, whether or
//   not the write succeeded, and cleared again when the lock is taken.
// - Values are rendered before the session state is touched, so a panicking
//   `Debug` impl leaves no header behind.
// - A poisoned lock is recovered, so a panic in one caller (e.g. inside a
//   user `Debug` impl) does not disable logging for the rest of the process.

use crate::core::compose::compose;
use crate::core::locator::SourceLocator;
use crate::core::model::CallSite;
use crate::core::render::{render_arguments, to_blob};
use crate::core::session::{format_elapsed, SessionTracker};
use crate::platform::config::LoggerConfig;
use crate::platform::fs;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Instant;

/// Mutable state guarded by the logger's lock.
#[derive(Debug)]
struct LoggerState {
    session: SessionTracker,
    locator: SourceLocator,
    buf: Vec<u8>,
}

/// A debug logger writing to one append-only file.
///
/// `q!` uses the process-wide instance from [`Logger::global`]; tests and
/// embedders can build their own with [`Logger::new`].
#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    state: Mutex<LoggerState>,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        let state = LoggerState {
            session: SessionTracker::new(config.inactivity_window, Instant::now()),
            locator: SourceLocator::new(config.macro_name.clone()),
            buf: Vec::new(),
        };
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    /// The process-wide logger, created with default settings on first use.
    pub fn global() -> &'static Logger {
        static GLOBAL: OnceLock<Logger> = OnceLock::new();
        GLOBAL.get_or_init(|| Logger::new(LoggerConfig::default()))
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.config.log_path
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Log `values` as written at `site`.
    pub fn log(&self, site: &CallSite, values: &[&dyn Debug]) {
        self.log_at(site, values, Instant::now(), Utc::now());
    }

    /// [`Logger::log`] with explicit clocks.
    pub fn log_at(
        &self,
        site: &CallSite,
        values: &[&dyn Debug],
        now: Instant,
        wall: DateTime<Utc>,
    ) {
        let mut state = self.lock();
        let state = &mut *state;
        // Leftovers of a call that panicked while holding the lock.
        state.buf.clear();

        let names = match state.locator.arg_names(site) {
            Ok(names) if names.len() == values.len() => names,
            Ok(names) => {
                tracing::debug!(
                    file = site.file,
                    line = site.line,
                    names = names.len(),
                    values = values.len(),
                    "Argument count mismatch, logging values without names"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Logging values without names");
                Vec::new()
            }
        };

        // User `Debug` code runs here, before the session or buffer change.
        let blobs: Vec<String> = render_arguments(&names, values)
            .iter()
            .map(to_blob)
            .collect();

        if let Some(header) = state.session.begin_call(site, now, wall) {
            state.buf.push(b'\n');
            state.buf.extend_from_slice(header.as_bytes());
            state.buf.push(b'\n');
        }

        let timestamp = format_elapsed(state.session.elapsed(now));
        let entry = compose(&timestamp, &blobs, self.config.max_line_width);
        state.buf.extend_from_slice(entry.as_bytes());

        self.flush(&mut state.buf);
    }

    /// Append the buffer to the log file and clear it, even on failure.
    fn flush(&self, buf: &mut Vec<u8>) {
        if let Err(e) = fs::append_log(&self.config.log_path, buf) {
            tracing::debug!(error = %e, "Dropping debug output");
        }
        buf.clear();
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::strip_ansi;
    use chrono::TimeZone;
    use std::io::Write;
    use std::time::Duration;

    struct Fixture {
        _dir: tempfile::TempDir,
        logger: Logger,
        source: &'static str,
    }

    /// A logger writing into a temp dir, plus a source file whose line 2
    /// holds `q!(a, b, c)` and line 3 holds `q!(cfg)`.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.rs");
        let mut f = std::fs::File::create(&source).unwrap();
        writeln!(f, "fn main() {{").unwrap();
        writeln!(f, "    q!(a, b, c);").unwrap();
        writeln!(f, "    q!(cfg);").unwrap();
        writeln!(f, "}}").unwrap();

        let logger = Logger::new(LoggerConfig::with_log_path(dir.path().join("q")));
        let source = Box::leak(source.to_string_lossy().into_owned().into_boxed_str());
        Fixture {
            _dir: dir,
            logger,
            source,
        }
    }

    fn site(file: &'static str, line: u32, function: &'static str) -> CallSite {
        CallSite {
            file,
            line,
            function,
            manifest_dir: None,
        }
    }

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 36).unwrap()
    }

    fn read_log(logger: &Logger) -> String {
        let raw = std::fs::read_to_string(logger.path()).unwrap();
        strip_ansi(&raw).into_owned()
    }

    #[test]
    fn test_fresh_session_scenario() {
        let fx = fixture();
        let t0 = Instant::now();
        fx.logger
            .log_at(&site(fx.source, 2, "main"), &[&1, &2, &3], t0, wall());

        assert_eq!(
            read_log(&fx.logger),
            "\n[14:00:36 a.rs:2 main]\n0.000s a=1 b=2 c=3\n"
        );
    }

    #[test]
    fn test_burst_has_one_header() {
        let fx = fixture();
        let s = site(fx.source, 2, "main");
        let t0 = Instant::now();
        fx.logger.log_at(&s, &[&1, &2, &3], t0, wall());
        fx.logger
            .log_at(&s, &[&4, &5, &6], t0 + Duration::from_millis(250), wall());

        let log = read_log(&fx.logger);
        assert_eq!(log.matches("[14:00:36").count(), 1, "{log}");
        assert!(log.ends_with("0.250s a=4 b=5 c=6\n"), "{log}");
    }

    #[test]
    fn test_gap_starts_new_session() {
        let fx = fixture();
        let s = site(fx.source, 2, "main");
        let t0 = Instant::now();
        fx.logger.log_at(&s, &[&1, &2, &3], t0, wall());
        fx.logger
            .log_at(&s, &[&1, &2, &3], t0 + Duration::from_secs(3), wall());

        let log = read_log(&fx.logger);
        assert_eq!(log.matches("[14:00:36").count(), 2, "{log}");
        assert!(log.ends_with("]\n0.000s a=1 b=2 c=3\n"), "{log}");
    }

    #[test]
    fn test_unknown_source_logs_bare_values() {
        let fx = fixture();
        let s = site("nowhere/missing.rs", 7, "main");
        fx.logger
            .log_at(&s, &[&"text", &42], Instant::now(), wall());

        let log = read_log(&fx.logger);
        assert!(log.ends_with("0.000s \"text\" 42\n"), "{log}");
        assert!(log.contains("[14:00:36 missing.rs:7 main]"), "{log}");
    }

    #[test]
    fn test_count_mismatch_logs_bare_values() {
        let fx = fixture();
        fx.logger
            .log_at(&site(fx.source, 2, "main"), &[&1, &2], Instant::now(), wall());
        assert!(read_log(&fx.logger).ends_with("0.000s 1 2\n"));
    }

    #[test]
    fn test_multiline_value_is_indented() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Cfg {
            service_name: &'static str,
            replicas: Vec<u32>,
            region: &'static str,
        }
        let cfg = Cfg {
            service_name: "payments-gateway",
            replicas: vec![1, 2, 3],
            region: "eu-west-1",
        };

        let fx = fixture();
        fx.logger
            .log_at(&site(fx.source, 3, "main"), &[&cfg], Instant::now(), wall());

        let log = read_log(&fx.logger);
        let body: Vec<&str> = log.lines().skip(2).collect();
        assert_eq!(body[0], "0.000s cfg=Cfg {");
        assert_eq!(body[1], "           service_name: \"payments-gateway\",");
        assert_eq!(body.last().copied(), Some("       }"));
    }

    #[test]
    fn test_write_failure_is_swallowed_and_buffer_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing-dir").join("q");
        let logger = Logger::new(LoggerConfig::with_log_path(&bad));
        let s = site("nowhere.rs", 1, "main");

        logger.log(&s, &[&1]);
        assert!(logger.lock().buf.is_empty());
        assert!(!bad.exists());
    }

    #[test]
    fn test_poisoned_lock_still_logs() {
        let fx = fixture();
        let logger = std::sync::Arc::new(fx.logger);
        let poisoner = std::sync::Arc::clone(&logger);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        logger.log(&site("nowhere.rs", 1, "main"), &[&"after"]);
        let raw = std::fs::read_to_string(logger.path()).unwrap();
        assert!(strip_ansi(&raw).contains("\"after\""));
    }

    struct Failing;

    impl Debug for Failing {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Err(std::fmt::Error)
        }
    }

    struct Panicking;

    impl Debug for Panicking {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            panic!("Debug impl panicked")
        }
    }

    #[test]
    fn test_failing_debug_logs_placeholder() {
        let fx = fixture();
        fx.logger
            .log_at(&site("nowhere.rs", 1, "f"), &[&Failing, &2], Instant::now(), wall());

        assert!(fx.logger.lock().buf.is_empty());
        let log = read_log(&fx.logger);
        assert_eq!(log, "\n[14:00:36 nowhere.rs:1 f]\n0.000s <Debug error> 2\n");
    }

    #[test]
    fn test_panicking_debug_leaves_no_header_behind() {
        let fx = fixture();
        let t0 = Instant::now();
        let aborted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            fx.logger
                .log_at(&site("nowhere.rs", 1, "f"), &[&Panicking], t0, wall());
        }));
        assert!(aborted.is_err());

        fx.logger
            .log_at(&site("other.rs", 2, "g"), &[&1], t0, wall());
        assert_eq!(
            read_log(&fx.logger),
            "\n[14:00:36 other.rs:2 g]\n0.000s 1\n"
        );
    }
}
