//! Time window for listing calendar events.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_PAST_DAYS: i64 = 30;
pub const DEFAULT_FUTURE_DAYS: i64 = 90;
/// Upper bound for either side of the window.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Listing window around a fixed "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl SyncWindow {
    pub fn around(now: DateTime<Utc>, past_days: i64, future_days: i64) -> Self {
        SyncWindow {
            from: now - Duration::days(past_days),
            to: now + Duration::days(future_days),
        }
    }

    /// Whether `[start, end]` reaches strictly into the window, as the
    /// calendar's `timeMin`/`timeMax` listing bounds do.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.to && end > self.from
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_around_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let window = SyncWindow::around(now, DEFAULT_PAST_DAYS, DEFAULT_FUTURE_DAYS);

        assert_eq!(window.from, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
        assert_eq!(window.to, Utc.with_ymd_and_hms(2024, 5, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_overlaps_uses_open_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let window = SyncWindow::around(now, 1, 1);
        let hour = Duration::hours(1);

        assert!(window.overlaps(now, now));
        assert!(window.overlaps(window.from - hour, window.from + hour));
        assert!(!window.overlaps(window.from - hour, window.from));
        assert!(!window.overlaps(window.to, window.to + hour));
        assert!(!window.overlaps(now + Duration::days(91), now + Duration::days(92)));
    }
}
