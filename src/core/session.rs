// qdebug - core/session.rs
//
// Groups consecutive logging calls into sessions.
//
// A session is a burst of calls from the same function and file with no
// idle gap of `window` or more between them. Each session starts with a
// header line and its own elapsed-time clock.
//
// The idle timer is a deadline re-armed on every call rather than a timer
// thread: "has the deadline passed?" is all the decision needs.

use crate::core::model::CallSite;
use crate::util::constants::HEADER_TIME_FORMAT;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Session state shared by every call through one logger.
#[derive(Debug)]
pub struct SessionTracker {
    window: Duration,
    /// Baseline for elapsed-time stamps.
    start: Instant,
    /// `None` until the first call.
    deadline: Option<Instant>,
    last_file: &'static str,
    last_function: &'static str,
}

impl SessionTracker {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            start: now,
            deadline: None,
            last_file: "",
            last_function: "",
        }
    }

    /// Record a call at `now` and return the header to print, if this call
    /// opens a new session.
    ///
    /// `wall` is only used for the header's clock time.
    pub fn begin_call(
        &mut self,
        site: &CallSite,
        now: Instant,
        wall: DateTime<Utc>,
    ) -> Option<String> {
        let lapsed = self.deadline.map_or(true, |deadline| now >= deadline);
        self.deadline = Some(now + self.window);

        let same_caller = site.function == self.last_function && site.file == self.last_file;
        self.last_function = site.function;
        self.last_file = site.file;

        if !lapsed && same_caller {
            return None;
        }

        self.start = now;
        Some(format_header(site, wall))
    }

    /// Time since the current session started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }
}

/// `[14:00:36 main.rs:12 demo::main]`
pub fn format_header(site: &CallSite, wall: DateTime<Utc>) -> String {
    format!(
        "[{} {}:{} {}]",
        wall.format(HEADER_TIME_FORMAT),
        site.file_name(),
        site.line,
        site.function
    )
}

/// Elapsed-time stamp with millisecond precision, e.g. `0.125s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const WINDOW: Duration = Duration::from_secs(2);

    fn site(file: &'static str, function: &'static str) -> CallSite {
        CallSite {
            file,
            line: 10,
            function,
            manifest_dir: None,
        }
    }

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 36).unwrap()
    }

    #[test]
    fn test_first_call_emits_header() {
        let t0 = Instant::now();
        let mut tracker = SessionTracker::new(WINDOW, t0);
        let header = tracker.begin_call(&site("src/a.rs", "a::main"), t0, wall());
        assert_eq!(header.as_deref(), Some("[14:00:36 a.rs:10 a::main]"));
        assert_eq!(tracker.elapsed(t0), Duration::ZERO);
    }

    #[test]
    fn test_burst_shares_header_and_clock() {
        let t0 = Instant::now();
        let s = site("src/a.rs", "a::main");
        let mut tracker = SessionTracker::new(WINDOW, t0);
        assert!(tracker.begin_call(&s, t0, wall()).is_some());

        let t1 = t0 + Duration::from_millis(500);
        assert!(tracker.begin_call(&s, t1, wall()).is_none());
        let t2 = t1 + Duration::from_millis(1_900);
        assert!(tracker.begin_call(&s, t2, wall()).is_none());

        assert!(tracker.elapsed(t2) > tracker.elapsed(t1));
        assert_eq!(tracker.elapsed(t2), Duration::from_millis(2_400));
    }

    #[test]
    fn test_idle_gap_starts_new_session() {
        let t0 = Instant::now();
        let s = site("src/a.rs", "a::main");
        let mut tracker = SessionTracker::new(WINDOW, t0);
        tracker.begin_call(&s, t0, wall());

        let t1 = t0 + WINDOW;
        assert!(tracker.begin_call(&s, t1, wall()).is_some());
        assert_eq!(tracker.elapsed(t1), Duration::ZERO);
    }

    #[test]
    fn test_caller_change_starts_new_session() {
        let t0 = Instant::now();
        let mut tracker = SessionTracker::new(WINDOW, t0);
        tracker.begin_call(&site("src/a.rs", "a::main"), t0, wall());

        let t1 = t0 + Duration::from_millis(100);
        assert!(tracker
            .begin_call(&site("src/a.rs", "a::helper"), t1, wall())
            .is_some());
        assert_eq!(tracker.elapsed(t1), Duration::ZERO);

        let t2 = t1 + Duration::from_millis(100);
        assert!(tracker
            .begin_call(&site("src/b.rs", "a::helper"), t2, wall())
            .is_some());
    }

    #[test]
    fn test_format_elapsed_precision() {
        assert_eq!(format_elapsed(Duration::ZERO), "0.000s");
        assert_eq!(format_elapsed(Duration::from_millis(1_234)), "1.234s");
    }
}
