//! Calendar-side event types.
//!
//! The target provider lists events as `RawTargetEvent`s. Only events that
//! carry the sync marker become `TargetEvent`s, with the linked source id
//! parsed once at that boundary.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::link;

/// Start or end of a calendar event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day value. As an end it is exclusive.
    Date(NaiveDate),
    DateTime {
        at: DateTime<FixedOffset>,
        time_zone: Option<Tz>,
    },
}

impl EventTime {
    /// Instant this value denotes. All-day values start at local midnight in `tz`.
    pub fn instant_in(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            EventTime::Date(date) => {
                let midnight = date.and_time(NaiveTime::MIN);
                tz.from_local_datetime(&midnight)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
                    .unwrap_or_else(|| midnight.and_utc())
            }
            EventTime::DateTime { at, .. } => at.with_timezone(&Utc),
        }
    }

    /// Calendar date of this value as seen from `tz`.
    pub fn day_in(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::Date(date) => *date,
            EventTime::DateTime { at, .. } => at.with_timezone(tz).date_naive(),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EventTime::DateTime { at, .. } => {
                write!(f, "{}", at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

/// An event as returned by the target listing, before ownership filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTargetEvent {
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub annotation: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// An event created by this system.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEvent {
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub annotation: String,
    pub last_modified_at: Option<DateTime<Utc>>,
    /// `None` when the marker is present but carries no readable id.
    pub linked_source_id: Option<String>,
}

impl TargetEvent {
    /// Returns `None` for events without the sync marker.
    pub fn from_raw(raw: RawTargetEvent) -> Option<Self> {
        let annotation = raw.annotation?;
        if !link::is_owned(&annotation) {
            return None;
        }
        let linked_source_id = link::extract(&annotation);

        Some(TargetEvent {
            id: raw.id,
            title: raw.title,
            start: raw.start,
            end: raw.end,
            annotation,
            last_modified_at: raw.last_modified_at,
            linked_source_id,
        })
    }
}

impl fmt::Display for TargetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Keep only owned events, preserving fetch order.
pub fn owned_events(raw: Vec<RawTargetEvent>) -> Vec<TargetEvent> {
    raw.into_iter().filter_map(TargetEvent::from_raw).collect()
}

/// Full replacement payload for creating or updating an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub annotation: String,
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, annotation: Option<&str>) -> RawTargetEvent {
        let day = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        RawTargetEvent {
            id: id.to_string(),
            title: "Standup".to_string(),
            start: EventTime::Date(day),
            end: EventTime::Date(day.succ_opt().unwrap()),
            annotation: annotation.map(str::to_string),
            last_modified_at: None,
        }
    }

    #[test]
    fn test_all_day_instant_is_local_midnight() {
        let day = EventTime::Date(NaiveDate::from_ymd_opt(2023, 12, 25).unwrap());

        assert_eq!(
            day.instant_in(&chrono_tz::Asia::Tokyo),
            Utc.with_ymd_and_hms(2023, 12, 24, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_owned_events_drops_unmarked_events() {
        let marked = link::embed("abc-123", None, None);
        let events = owned_events(vec![
            raw("e1", None),
            raw("e2", Some("Lunch with Sam")),
            raw("e3", Some(&marked)),
        ]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "e3");
        assert_eq!(events[0].linked_source_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_marker_without_id_is_owned_but_unlinked() {
        let event = TargetEvent::from_raw(raw("e1", Some("[Notion-Sync]\nsomething else")))
            .expect("Tagged event should be owned");

        assert_eq!(event.linked_source_id, None);
    }

    #[test]
    fn test_day_in_uses_reference_zone() {
        let at = DateTime::parse_from_rfc3339("2023-12-25T20:30:00Z").unwrap();
        let time = EventTime::DateTime {
            at,
            time_zone: None,
        };

        assert_eq!(
            time.day_in(&chrono_tz::Asia::Tokyo),
            NaiveDate::from_ymd_opt(2023, 12, 26).unwrap()
        );
        assert_eq!(
            time.day_in(&chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
    }

    #[test]
    fn test_display_utc_datetime_uses_z_suffix() {
        let at = DateTime::parse_from_rfc3339("2023-12-25T14:30:00Z").unwrap();
        let time = EventTime::DateTime {
            at,
            time_zone: Some(chrono_tz::Asia::Tokyo),
        };

        assert_eq!(time.to_string(), "2023-12-25T14:30:00Z");
    }
}
