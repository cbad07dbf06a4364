use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use google_calendar::types::{Event, EventDateTime};
use schedsync_core::event::{EventTime, RawTargetEvent};

use super::FromGoogle;

impl FromGoogle<EventDateTime> for EventTime {
    fn from_google(time: EventDateTime) -> Result<Self> {
        if let Some(at) = time.date_time {
            // An unknown zone name only loses the label, not the instant.
            let time_zone = time.time_zone.parse::<Tz>().ok();
            Ok(EventTime::DateTime {
                at: at.fixed_offset(),
                time_zone,
            })
        } else if let Some(date) = time.date {
            Ok(EventTime::Date(date))
        } else {
            Err(anyhow!("neither date nor dateTime is set"))
        }
    }
}

impl FromGoogle<Event> for RawTargetEvent {
    fn from_google(event: Event) -> Result<Self> {
        let start = event
            .start
            .ok_or_else(|| anyhow!("Event {} has no start time", event.id))
            .and_then(EventTime::from_google)?;
        let end = event
            .end
            .ok_or_else(|| anyhow!("Event {} has no end time", event.id))
            .and_then(EventTime::from_google)?;

        Ok(RawTargetEvent {
            id: event.id,
            title: event.summary,
            start,
            end,
            annotation: if event.description.is_empty() {
                None
            } else {
                Some(event.description)
            },
            last_modified_at: event.updated,
        })
    }
}
