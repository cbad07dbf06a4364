//! Mapping of source date ranges onto calendar start/end values.
//!
//! Calendar all-day spans end on the day *after* the last day, so date-only
//! ends are shifted by one day. Timed values keep their instant and gain the
//! configured time zone.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{SyncError, SyncResult};
use crate::event::EventTime;
use crate::source::ActionDay;

/// Naive date-time layouts accepted when a value carries no UTC offset.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRange {
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    time_zone: Tz,
}

impl DateNormalizer {
    pub fn new(time_zone: Tz) -> Self {
        DateNormalizer { time_zone }
    }

    pub fn normalize(&self, range: &ActionDay) -> SyncResult<NormalizedRange> {
        let start_raw = range
            .start()
            .ok_or_else(|| SyncError::InvalidRange("range has no start".into()))?;
        let start = self.parse_endpoint(start_raw)?;

        // A missing end repeats the start: one all-day day, or a zero-length timed event.
        let end = match range.end() {
            Some(end_raw) => self.parse_endpoint(end_raw)?,
            None => start.clone(),
        };

        Ok(NormalizedRange {
            start,
            end: exclusive_end(end)?,
        })
    }

    /// Calendar date of `time` in the reference zone.
    pub fn calendar_day(&self, time: &EventTime) -> NaiveDate {
        time.day_in(&self.time_zone)
    }

    /// Instant of `time`, reading all-day values in the reference zone.
    pub fn instant(&self, time: &EventTime) -> DateTime<Utc> {
        time.instant_in(&self.time_zone)
    }

    fn parse_endpoint(&self, raw: &str) -> SyncResult<EventTime> {
        if !has_time_component(raw) {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                SyncError::InvalidRange(format!("'{}' is not a YYYY-MM-DD date", raw))
            })?;
            return Ok(EventTime::Date(date));
        }

        let at = match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => at,
            Err(_) => self.parse_local(raw)?,
        };

        Ok(EventTime::DateTime {
            at,
            time_zone: Some(self.time_zone),
        })
    }

    /// Offset-less date-times are wall-clock times in the reference zone.
    fn parse_local(&self, raw: &str) -> SyncResult<DateTime<chrono::FixedOffset>> {
        let naive = NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| {
                SyncError::InvalidRange(format!("'{}' is not an ISO 8601 date-time", raw))
            })?;

        self.time_zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.fixed_offset())
            .ok_or_else(|| {
                SyncError::InvalidRange(format!(
                    "'{}' does not exist in time zone {}",
                    raw, self.time_zone
                ))
            })
    }
}

fn has_time_component(raw: &str) -> bool {
    raw.contains('T')
}

fn exclusive_end(end: EventTime) -> SyncResult<EventTime> {
    match end {
        EventTime::Date(date) => date
            .checked_add_days(Days::new(1))
            .map(EventTime::Date)
            .ok_or_else(|| SyncError::InvalidRange(format!("no day after {}", date))),
        timed => Ok(timed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Tokyo;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new(Tokyo)
    }

    fn date(y: i32, m: u32, d: u32) -> EventTime {
        EventTime::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn timed(raw: &str) -> EventTime {
        EventTime::DateTime {
            at: DateTime::parse_from_rfc3339(raw).unwrap(),
            time_zone: Some(Tokyo),
        }
    }

    #[test]
    fn test_all_day_without_end_spans_one_day() {
        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-25", None))
            .unwrap();

        assert_eq!(range.start, date(2023, 12, 25));
        assert_eq!(range.end, date(2023, 12, 26));
    }

    #[test]
    fn test_all_day_range_end_is_exclusive() {
        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-25", Some("2023-12-27")))
            .unwrap();

        assert_eq!(range.start, date(2023, 12, 25));
        assert_eq!(range.end, date(2023, 12, 28));
    }

    #[test]
    fn test_all_day_end_rolls_over_year() {
        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-31", None))
            .unwrap();

        assert_eq!(range.end, date(2024, 1, 1));
    }

    #[test]
    fn test_timed_without_end_is_zero_length() {
        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-25T14:30:00Z", None))
            .unwrap();

        assert_eq!(range.start, timed("2023-12-25T14:30:00Z"));
        assert_eq!(range.end, range.start);
        assert_eq!(range.start.to_string(), "2023-12-25T14:30:00Z");
    }

    #[test]
    fn test_timed_range_passes_through_with_zone() {
        let range = normalizer()
            .normalize(&ActionDay::new(
                "2023-12-25T10:00:00.000+09:00",
                Some("2023-12-25T11:30:00.000+09:00"),
            ))
            .unwrap();

        assert_eq!(range.start, timed("2023-12-25T10:00:00+09:00"));
        assert_eq!(range.end, timed("2023-12-25T11:30:00+09:00"));
    }

    #[test]
    fn test_mixed_endpoints_are_handled_independently() {
        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-25", Some("2023-12-26T09:00:00+09:00")))
            .unwrap();
        assert_eq!(range.start, date(2023, 12, 25));
        assert_eq!(range.end, timed("2023-12-26T09:00:00+09:00"));

        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-25T09:00:00+09:00", Some("2023-12-26")))
            .unwrap();
        assert_eq!(range.start, timed("2023-12-25T09:00:00+09:00"));
        assert_eq!(range.end, date(2023, 12, 27));
    }

    #[test]
    fn test_offsetless_datetime_is_read_in_reference_zone() {
        let range = normalizer()
            .normalize(&ActionDay::new("2023-12-25T09:00", None))
            .unwrap();

        assert_eq!(range.start, timed("2023-12-25T09:00:00+09:00"));
    }

    #[test]
    fn test_missing_start_is_invalid() {
        let result = normalizer().normalize(&ActionDay {
            start: None,
            end: Some("2023-12-25".to_string()),
        });

        assert!(matches!(result, Err(SyncError::InvalidRange(_))));
    }

    #[test]
    fn test_garbage_endpoint_is_invalid() {
        let result = normalizer().normalize(&ActionDay::new("next tuesday", None));

        assert!(matches!(result, Err(SyncError::InvalidRange(_))));
    }

    #[test]
    fn test_calendar_day_near_midnight() {
        // 23:30 in Tokyo is still the 25th there, but the 25th 14:30 UTC.
        let late = timed("2023-12-25T23:30:00+09:00");
        assert_eq!(
            normalizer().calendar_day(&late),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );

        let utc_late = timed("2023-12-25T23:30:00Z");
        assert_eq!(
            normalizer().calendar_day(&utc_late),
            NaiveDate::from_ymd_opt(2023, 12, 26).unwrap()
        );
    }
}
