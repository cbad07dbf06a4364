//! Records read from the source (Notion) database.

use chrono::{DateTime, Utc};

/// The raw "Action Day" date property: ISO 8601 strings, date-only or date-time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionDay {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl ActionDay {
    pub fn new(start: impl Into<String>, end: Option<&str>) -> Self {
        ActionDay {
            start: Some(start.into()),
            end: end.map(str::to_string),
        }
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref().filter(|s| !s.is_empty())
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref().filter(|s| !s.is_empty())
    }
}

/// A schedule record owned by the source system.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItem {
    pub id: String,
    pub title: String,
    pub action_day: ActionDay,
    pub status: Option<String>,
    /// Cached id of the linked calendar event. Advisory only: linking is
    /// always done through the marker embedded in the event.
    pub external_event_id: Option<String>,
    pub url: Option<String>,
    pub last_modified_at: DateTime<Utc>,
}

impl SourceItem {
    /// Items without a start date never reach the reconciliation engine.
    pub fn is_eligible(&self) -> bool {
        self.action_day.start().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(start: Option<&str>) -> SourceItem {
        SourceItem {
            id: "1f2e3d4c-0000-4000-8000-123456789abc".to_string(),
            title: "Dentist".to_string(),
            action_day: ActionDay {
                start: start.map(str::to_string),
                end: None,
            },
            status: None,
            external_event_id: None,
            url: None,
            last_modified_at: Utc.with_ymd_and_hms(2023, 12, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_item_with_start_is_eligible() {
        assert!(item(Some("2023-12-25")).is_eligible());
    }

    #[test]
    fn test_item_without_start_is_not_eligible() {
        assert!(!item(None).is_eligible());
        assert!(!item(Some("")).is_eligible());
    }
}
