//! Time-of-day gating and timestamp helpers.
//!
//! The aggregate run is triggered by an external scheduler at a fine
//! resolution (every few minutes) but should only do work shortly after the
//! official draw announcements. [`TimeGate`] answers "is now inside one of the
//! permitted windows?" using only the wall-clock time in a fixed civil offset,
//! never the calendar date, so each window opens once per day.
//!
//! Default windows (Asia/Bangkok, UTC+07:00, no DST):
//! - **16:30** to 16:35
//! - **21:00** to 21:05

use chrono::{DateTime, FixedOffset, NaiveTime, SecondsFormat, TimeZone, Timelike, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Asia/Bangkok has no daylight saving, so a fixed offset is exact.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

pub const DEFAULT_WINDOW_MINUTES: u32 = 5;

pub const DEFAULT_RUN_WINDOWS: [RunWindow; 2] =
    [RunWindow::new(16, 30), RunWindow::new(21, 0)];

/// Start of a permitted run window, as local time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunWindow {
    pub hour: u32,
    pub minute: u32,
}

impl RunWindow {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    fn start_minute(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for RunWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Decides whether a run may proceed at a given time of day.
#[derive(Debug, Clone)]
pub struct TimeGate {
    windows: Vec<RunWindow>,
    width_minutes: u32,
    offset: FixedOffset,
}

impl Default for TimeGate {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_WINDOWS.to_vec(), DEFAULT_WINDOW_MINUTES, bangkok())
    }
}

impl TimeGate {
    pub fn new(windows: Vec<RunWindow>, width_minutes: u32, offset: FixedOffset) -> Self {
        Self { windows, width_minutes, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// `true` iff `time` falls in `[start, start + width)` of any window.
    ///
    /// Seconds are ignored. Windows are measured in minutes of the local day
    /// and do not wrap: a window that would run past midnight closes at 24:00.
    pub fn allows(&self, time: NaiveTime) -> bool {
        let now = time.hour() * 60 + time.minute();
        self.windows.iter().any(|window| {
            let start = window.start_minute();
            now >= start && now < start + self.width_minutes
        })
    }

    /// Evaluates [`TimeGate::allows`] after converting `instant` to the gate's offset.
    pub fn allows_at<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        self.allows(instant.with_timezone(&self.offset).time())
    }

    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn allows_now(&self) -> bool {
        self.allows_at(&self.local_now())
    }

    /// Human-readable window list for log lines, e.g. `16:30, 21:00`.
    pub fn describe_windows(&self) -> String {
        self.windows.iter().join(", ")
    }
}

/// The fixed UTC+07:00 offset used for Thai lottery schedules.
pub fn bangkok() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
        .expect("UTC+07:00 is a valid offset")
}

/// Current instant as RFC 3339 with milliseconds in `offset`.
pub fn now_iso(offset: FixedOffset) -> String {
    format_iso(&Utc::now().with_timezone(&offset))
}

pub fn format_iso(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_default_windows_boundaries() {
        let gate = TimeGate::default();
        assert!(!gate.allows(hm(16, 29)));
        assert!(gate.allows(hm(16, 30)));
        assert!(gate.allows(hm(16, 34)));
        assert!(gate.allows(NaiveTime::from_hms_opt(16, 34, 59).unwrap()));
        assert!(!gate.allows(hm(16, 35)));
        assert!(!gate.allows(hm(20, 59)));
        assert!(gate.allows(hm(21, 0)));
        assert!(gate.allows(hm(21, 4)));
        assert!(!gate.allows(hm(21, 5)));
        assert!(!gate.allows(hm(0, 0)));
    }

    #[test]
    fn test_every_minute_of_day_matches_window_interval() {
        for width in [1u32, 5, 30] {
            let gate = TimeGate::new(DEFAULT_RUN_WINDOWS.to_vec(), width, bangkok());
            for minute_of_day in 0..MINUTES_PER_DAY {
                let time = hm(minute_of_day / 60, minute_of_day % 60);
                let expected = DEFAULT_RUN_WINDOWS.iter().any(|w| {
                    let start = w.hour * 60 + w.minute;
                    minute_of_day >= start && minute_of_day < start + width
                });
                assert_eq!(gate.allows(time), expected, "width {width}, time {time}");
            }
        }
    }

    #[test]
    fn test_calendar_date_is_ignored() {
        let gate = TimeGate::default();
        let offset = bangkok();
        for (y, m, d) in [(2024, 1, 1), (2024, 2, 29), (2025, 12, 31)] {
            let day = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let open = day.and_hms_opt(16, 31, 0).unwrap();
            let closed = day.and_hms_opt(17, 0, 0).unwrap();
            assert!(gate.allows_at(&offset.from_local_datetime(&open).unwrap()));
            assert!(!gate.allows_at(&offset.from_local_datetime(&closed).unwrap()));
        }
    }

    #[test]
    fn test_allows_at_converts_to_gate_offset() {
        let gate = TimeGate::default();
        // 09:31 UTC is 16:31 in Bangkok.
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 9, 31, 0).unwrap();
        assert!(gate.allows_at(&utc));
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 16, 31, 0).unwrap();
        assert!(!gate.allows_at(&utc));
    }

    #[test]
    fn test_window_closes_at_midnight() {
        let gate = TimeGate::new(vec![RunWindow::new(23, 58)], 5, bangkok());
        assert!(!gate.allows(hm(23, 57)));
        assert!(gate.allows(hm(23, 58)));
        assert!(gate.allows(hm(23, 59)));
        assert!(!gate.allows(hm(0, 0)));
        assert!(!gate.allows(hm(0, 2)));
    }

    #[test]
    fn test_no_windows_never_allows() {
        let gate = TimeGate::new(Vec::new(), 5, bangkok());
        assert!(!gate.allows(hm(16, 30)));
    }

    #[test]
    fn test_describe_windows() {
        assert_eq!(TimeGate::default().describe_windows(), "16:30, 21:00");
    }

    #[test]
    fn test_format_iso_uses_offset_and_millis() {
        let instant = bangkok().with_ymd_and_hms(2024, 1, 1, 16, 30, 0).unwrap();
        assert_eq!(format_iso(&instant), "2024-01-01T16:30:00.000+07:00");
    }

    #[test]
    fn test_now_iso_parses_back() {
        let stamp = now_iso(bangkok());
        let parsed = DateTime::parse_from_rfc3339(&stamp).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_allows_now_with_whole_day_window() {
        let open = TimeGate::new(vec![RunWindow::new(0, 0)], MINUTES_PER_DAY, bangkok());
        assert!(open.allows_now());
        let none = TimeGate::new(Vec::new(), DEFAULT_WINDOW_MINUTES, bangkok());
        assert!(!none.allows_now());
    }
}
