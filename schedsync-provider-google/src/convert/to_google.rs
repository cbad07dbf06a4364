use chrono::Utc;
use google_calendar::types::{Event, EventDateTime};
use schedsync_core::event::{EventTime, NormalizedEvent};

use super::ToGoogle;

impl ToGoogle<EventDateTime> for EventTime {
    fn to_google(&self) -> EventDateTime {
        match self {
            EventTime::Date(date) => EventDateTime {
                date: Some(*date),
                date_time: None,
                time_zone: String::new(),
            },
            EventTime::DateTime { at, time_zone } => EventDateTime {
                date: None,
                date_time: Some(at.with_timezone(&Utc)),
                time_zone: time_zone.map(|tz| tz.name().to_string()).unwrap_or_default(),
            },
        }
    }
}

impl ToGoogle<Event> for NormalizedEvent {
    fn to_google(&self) -> Event {
        Event {
            summary: self.title.clone(),
            description: self.annotation.clone(),
            start: Some(self.start.to_google()),
            end: Some(self.end.to_google()),
            ..Default::default()
        }
    }
}

/// Payload for insert/update, with the configured color if any.
pub fn with_color(event: &NormalizedEvent, color_id: Option<&str>) -> Event {
    let mut google_event = event.to_google();
    if let Some(color_id) = color_id {
        google_event.color_id = color_id.to_string();
    }
    google_event
}
